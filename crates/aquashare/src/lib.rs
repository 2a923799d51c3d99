//! Shared irrigation cost allocation.
//!
//! Sprinklers fed by a common supply point ("faucet") cover a footprint; the
//! farmers whose parcels fall under that footprint share the supply point's
//! annual draw in proportion to covered area, and are billed under a two-tier
//! tariff.
//!
//! Pipeline (pure functions, leaves first)
//! - `alloc::zones`: sprinkler circles unioned into one footprint per supply point.
//! - `alloc::partition`: incremental overlay of owned parcels into disjoint cells.
//! - `alloc::shares`: equal split of each cell among its farmers, normalized.
//! - `alloc::usage`: draw × share summed per farmer.
//! - `alloc::billing`: base fee + base allotment + overage.
//!
//! Around the core
//! - `geom`: `Shape` and the `GeometryOps` seam over the `geo` crate.
//! - `model`: immutable `Dataset` snapshots and their edit operations.
//! - `document`: the versioned JSON interchange format.
//! - `synth`: seeded synthetic scenarios for tests and benches.

pub mod alloc;
pub mod api;
pub mod cfg;
pub mod document;
pub mod geom;
pub mod model;
pub mod synth;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::alloc::{
        run, AllocCfg, Allocation, CoverageCell, FarmerBilling, FaucetShare, RecalcMode, Tariff,
        UsageBasis,
    };
    pub use crate::document::{parse_document, serialize_document, DocumentError};
    pub use crate::geom::{GeometryOps, Planar, Shape, Wgs84};
    pub use crate::model::{
        Dataset, Farmer, FarmerId, FarmerShare, MapView, Parcel, ParcelId, Sprinkler,
        SprinklerId, SupplyPoint, SupplyPointId,
    };
}
