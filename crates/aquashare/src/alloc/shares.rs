//! Share Calculator: equal split per cell, normalized over the covered area.
//!
//! Rounding
//! - Fractions are reported at `SHARE_DECIMALS` digits. They are apportioned in
//!   integer millionths with the largest-remainder method, so the reported
//!   values of one supply point sum to exactly 1; each differs from plain
//!   rounding by at most one unit in the last digit.
//! - The leftover units go to the largest remainders, ties to the lower farmer
//!   id. Identical claimants can therefore differ by one unit: seven farmers on
//!   one cell get `0.142858` for the first id and `0.142857` for the rest.
//! - A farmer whose rounded share is `<= EPS` (one unit) is dropped and the
//!   rest are apportioned again.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::partition::CoverageCell;
use crate::cfg::{EPS, SHARE_UNITS};
use crate::geom::GeometryOps;
use crate::model::{FarmerId, SupplyPointId};

/// Computed share of one farmer on one supply point.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FaucetShare {
    pub supply_point: SupplyPointId,
    pub farmer: FarmerId,
    /// Fraction in (EPS, 1] at `SHARE_DECIMALS` digits. Equal claims may differ
    /// by one unit in the last digit; see the module docs.
    pub share: f64,
    /// Allocated area (backend units) before normalization.
    pub area: f64,
}

/// Per-farmer shares of one footprint's cells.
///
/// Empty when the total covered area is `<= EPS`. Farmers whose fraction, before
/// or after rounding, is `<= EPS` are dropped. Sorted by share descending, then
/// farmer id ascending.
pub fn shares_from_cells<G: GeometryOps + ?Sized>(
    ops: &G,
    supply_point: &SupplyPointId,
    cells: &[CoverageCell],
) -> Vec<FaucetShare> {
    let mut allocated: BTreeMap<&FarmerId, f64> = BTreeMap::new();
    let mut covered = 0.0;
    for cell in cells {
        let area = ops.area(&cell.shape);
        if !(area.is_finite() && area > EPS) || cell.farmers.is_empty() {
            continue;
        }
        covered += area;
        let part = area / cell.farmers.len() as f64;
        for farmer in &cell.farmers {
            *allocated.entry(farmer).or_insert(0.0) += part;
        }
    }
    if covered <= EPS {
        return Vec::new();
    }

    let mut kept: Vec<(&FarmerId, f64, f64)> = allocated
        .into_iter()
        .map(|(farmer, area)| (farmer, area, area / covered))
        .filter(|(_, _, fraction)| *fraction > EPS)
        .collect();
    let min_units = (EPS * SHARE_UNITS as f64).round() as u64;
    let units = loop {
        let units = apportion(&kept.iter().map(|k| k.2).collect::<Vec<_>>(), SHARE_UNITS);
        if units.iter().all(|&u| u > min_units) {
            break units;
        }
        kept = kept
            .into_iter()
            .zip(&units)
            .filter(|(_, &u)| u > min_units)
            .map(|(k, _)| k)
            .collect();
    };

    let mut out: Vec<(u64, FaucetShare)> = kept
        .into_iter()
        .zip(units)
        .map(|((farmer, area, _), u)| {
            (
                u,
                FaucetShare {
                    supply_point: supply_point.clone(),
                    farmer: farmer.clone(),
                    share: u as f64 / SHARE_UNITS as f64,
                    area,
                },
            )
        })
        .collect();
    out.sort_by(|(ua, a), (ub, b)| ub.cmp(ua).then_with(|| a.farmer.cmp(&b.farmer)));
    out.into_iter().map(|(_, s)| s).collect()
}

/// Largest-remainder apportionment of `total` integer units by `weights`.
///
/// Remainder ties go to the lower index, i.e. the lower farmer id, since
/// callers pass weights in id order.
pub(crate) fn apportion(weights: &[f64], total: u64) -> Vec<u64> {
    let sum: f64 = weights.iter().sum();
    if weights.is_empty() || !(sum.is_finite() && sum > 0.0) {
        return vec![0; weights.len()];
    }
    let exact: Vec<f64> = weights.iter().map(|w| w / sum * total as f64).collect();
    let mut units: Vec<u64> = exact.iter().map(|e| e.floor() as u64).collect();
    let assigned: u64 = units.iter().sum();
    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&i, &j| {
        let ri = exact[i] - exact[i].floor();
        let rj = exact[j] - exact[j].floor();
        rj.partial_cmp(&ri).unwrap_or(Ordering::Equal).then(i.cmp(&j))
    });
    for &i in order.iter().cycle().take(total.saturating_sub(assigned) as usize) {
        units[i] += 1;
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Planar, Shape};

    #[test]
    fn apportion_sums_exactly() {
        let u = apportion(&[1.0, 1.0, 1.0], 1_000_000);
        assert_eq!(u.iter().sum::<u64>(), 1_000_000);
        // Tie on remainders goes to the first index.
        assert_eq!(u, vec![333_334, 333_333, 333_333]);
    }

    #[test]
    fn identical_claimants_differ_by_at_most_one_unit() {
        let u = apportion(&[1.0; 7], 1_000_000);
        assert_eq!(u[0], 142_858);
        assert!(u[1..].iter().all(|&x| x == 142_857));
    }

    fn cell(min: [f64; 2], max: [f64; 2], farmer: &str) -> CoverageCell {
        CoverageCell {
            shape: Shape::rect(min, max),
            farmers: [FarmerId::from(farmer)].into_iter().collect(),
        }
    }

    #[test]
    fn share_rounding_to_one_unit_is_dropped() {
        // b holds 1.2e-6 of the cover: above EPS before rounding, one unit after.
        let cells = [
            cell([0.0, 0.0], [1000.0, 1000.0], "a"),
            cell([2000.0, 0.0], [2001.2, 1.0], "b"),
        ];
        let shares = shares_from_cells(&Planar, &SupplyPointId::from("f"), &cells);
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].farmer.as_str(), "a");
        assert_eq!(shares[0].share, 1.0);
    }

    #[test]
    fn apportion_matches_plain_rounding_when_exact() {
        assert_eq!(apportion(&[3.0, 1.0], 1_000_000), vec![750_000, 250_000]);
        assert_eq!(apportion(&[], 1_000_000), Vec::<u64>::new());
        assert_eq!(apportion(&[0.0, 0.0], 10), vec![0, 0]);
    }
}
