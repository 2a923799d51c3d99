//! Entities and immutable dataset snapshots.
//!
//! - `ids`: string newtypes per entity kind.
//! - `entities`: farmers, supply points, sprinklers, parcels, map view.
//! - `dataset`: `Dataset` and its snapshot-producing edit operations.
//!
//! The engine only reads these; every edit returns a new `Dataset`.

mod dataset;
mod entities;
mod ids;

pub use dataset::{new_id, Dataset, DEFAULT_FARMER_NAME};
pub use entities::{Farmer, FarmerShare, MapView, Parcel, Sprinkler, SupplyPoint};
pub use ids::{FarmerId, ParcelId, SprinklerId, SupplyPointId};
