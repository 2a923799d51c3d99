//! Full pipeline over one dataset snapshot.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::info;

use super::billing::{calculate_billing, FarmerBilling, Tariff};
use super::partition::partition_footprint;
use super::shares::{shares_from_cells, FaucetShare};
use super::usage::{aggregate_recorded_usage, aggregate_usage};
use super::zones::build_footprints;
use crate::cfg::{DEFAULT_CIRCLE_STEPS, DEFAULT_RADIUS_M};
use crate::geom::{GeometryOps, Shape};
use crate::model::{Dataset, FarmerId, Parcel, Sprinkler, SupplyPointId};

/// Which shares feed the usage aggregation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UsageBasis {
    /// Shares computed by this run.
    #[default]
    Computed,
    /// Shares recorded on the supply points (user overrides included).
    Recorded,
}

/// Allocation configuration.
#[derive(Clone, Copy, Debug)]
pub struct AllocCfg {
    /// Sprinkler coverage radius (meters for `Wgs84`).
    pub buffer_radius_m: f64,
    /// Circle segment count.
    pub circle_steps: usize,
    pub usage_basis: UsageBasis,
}

impl Default for AllocCfg {
    fn default() -> Self {
        Self {
            buffer_radius_m: DEFAULT_RADIUS_M,
            circle_steps: DEFAULT_CIRCLE_STEPS,
            usage_basis: UsageBasis::Computed,
        }
    }
}

/// Everything derived from one dataset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Allocation {
    pub footprints: BTreeMap<SupplyPointId, Shape>,
    pub shares: BTreeMap<SupplyPointId, Vec<FaucetShare>>,
    pub usage: BTreeMap<FarmerId, f64>,
    pub billing: BTreeMap<FarmerId, FarmerBilling>,
}

impl Allocation {
    /// Computed shares of one supply point; empty if it has no footprint.
    pub fn shares_for(&self, id: &SupplyPointId) -> &[FaucetShare] {
        self.shares.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Shares per footprint. Footprints are independent and processed in parallel.
pub fn shares_for_footprints<G: GeometryOps + ?Sized>(
    ops: &G,
    footprints: &BTreeMap<SupplyPointId, Shape>,
    parcels: &[Parcel],
) -> BTreeMap<SupplyPointId, Vec<FaucetShare>> {
    footprints
        .par_iter()
        .map(|(id, footprint)| {
            let cells = partition_footprint(ops, footprint, parcels);
            (id.clone(), shares_from_cells(ops, id, &cells))
        })
        .collect()
}

/// Footprints and shares for every supply point referenced by a sprinkler.
pub fn compute_faucet_shares<G: GeometryOps + ?Sized>(
    ops: &G,
    sprinklers: &[Sprinkler],
    parcels: &[Parcel],
    cfg: &AllocCfg,
) -> BTreeMap<SupplyPointId, Vec<FaucetShare>> {
    let footprints = build_footprints(ops, sprinklers, cfg.buffer_radius_m, cfg.circle_steps);
    shares_for_footprints(ops, &footprints, parcels)
}

/// Run the whole pipeline: footprints → shares → usage → bills.
pub fn run<G: GeometryOps + ?Sized>(
    ops: &G,
    dataset: &Dataset,
    cfg: &AllocCfg,
    tariff: &Tariff,
) -> Allocation {
    let footprints = build_footprints(
        ops,
        &dataset.sprinklers,
        cfg.buffer_radius_m,
        cfg.circle_steps,
    );
    let shares = shares_for_footprints(ops, &footprints, &dataset.parcels);
    let usage = match cfg.usage_basis {
        UsageBasis::Computed => aggregate_usage(&dataset.supply_points, &shares),
        UsageBasis::Recorded => aggregate_recorded_usage(&dataset.supply_points),
    };
    let billing = calculate_billing(ops, tariff, &dataset.parcels, &usage);
    info!(
        footprints = footprints.len(),
        shared_supply_points = shares.values().filter(|s| !s.is_empty()).count(),
        farmers_with_usage = usage.len(),
        bills = billing.len(),
        "allocation"
    );
    Allocation {
        footprints,
        shares,
        usage,
        billing,
    }
}
