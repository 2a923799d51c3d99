//! Usage Aggregator: annual draw × share, summed per farmer.

use std::collections::BTreeMap;

use super::shares::FaucetShare;
use crate::model::{FarmerId, SupplyPoint, SupplyPointId};

/// Usage per farmer from computed shares.
///
/// Supply points missing from `supply_points`, or with zero, negative or
/// non-finite draw, contribute nothing. Only farmers with usage > 0 appear.
pub fn aggregate_usage(
    supply_points: &[SupplyPoint],
    shares: &BTreeMap<SupplyPointId, Vec<FaucetShare>>,
) -> BTreeMap<FarmerId, f64> {
    let mut usage = BTreeMap::new();
    for sp in supply_points {
        let Some(list) = shares.get(&sp.id) else {
            continue;
        };
        accumulate(
            &mut usage,
            sp.effective_draw(),
            list.iter().map(|s| (&s.farmer, s.share)),
        );
    }
    usage
}

/// Usage per farmer from the user-recorded shares on each supply point.
pub fn aggregate_recorded_usage(supply_points: &[SupplyPoint]) -> BTreeMap<FarmerId, f64> {
    let mut usage = BTreeMap::new();
    for sp in supply_points {
        accumulate(
            &mut usage,
            sp.effective_draw(),
            sp.shares.iter().map(|s| (&s.farmer_id, s.share)),
        );
    }
    usage
}

fn accumulate<'a>(
    usage: &mut BTreeMap<FarmerId, f64>,
    draw: f64,
    shares: impl Iterator<Item = (&'a FarmerId, f64)>,
) {
    if draw <= 0.0 {
        return;
    }
    for (farmer, share) in shares {
        let amount = draw * share;
        if !(amount.is_finite() && amount > 0.0) {
            continue;
        }
        *usage.entry(farmer.clone()).or_insert(0.0) += amount;
    }
}
