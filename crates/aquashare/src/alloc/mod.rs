//! Allocation engine: footprints → coverage cells → shares → usage → bills.
//!
//! Purpose
//! - Turn sprinkler positions, owned parcels and per-supply-point draw into a
//!   per-farmer usage share and a tariff bill.
//! - Every stage is a pure function of its inputs; `run` recomputes everything
//!   on each call. Nothing is cached between calls.
//!
//! Determinism
//! - Keyed outputs are `BTreeMap`s and share lists are sorted (share desc,
//!   farmer id asc), so repeated runs and parallel runs produce identical output.
//!
//! Code cross-refs: `geom::{GeometryOps, Shape}`, `model::Dataset`, `cfg::EPS`.

mod billing;
mod partition;
mod pipeline;
mod recalc;
mod shares;
mod usage;
mod zones;

pub use billing::{bill_farmer, calculate_billing, FarmerBilling, Tariff};
pub use partition::{partition_footprint, CoverageCell};
pub use pipeline::{
    compute_faucet_shares, run, shares_for_footprints, AllocCfg, Allocation, UsageBasis,
};
pub use recalc::{apply_computed_shares, RecalcMode};
pub use shares::{shares_from_cells, FaucetShare};
pub use usage::{aggregate_recorded_usage, aggregate_usage};
pub use zones::{build_footprints, union_all};
