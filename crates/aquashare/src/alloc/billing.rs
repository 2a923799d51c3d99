//! Billing Engine: two-tier tariff over assessed area and usage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geom::GeometryOps;
use crate::model::{FarmerId, Parcel};

/// Tariff schedule. Units: currency per m², m³ per m², currency per m³.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tariff {
    pub area_rate: f64,
    pub base_volume_per_area: f64,
    pub base_volume_factor: f64,
    pub overage_rate: f64,
}

impl Default for Tariff {
    fn default() -> Self {
        Self {
            area_rate: 2.0,
            base_volume_per_area: 0.26,
            base_volume_factor: 1.2,
            overage_rate: 15.0,
        }
    }
}

impl Tariff {
    /// Volume included in the base fee for `area`.
    #[inline]
    pub fn base_volume(&self, area: f64) -> f64 {
        area * self.base_volume_per_area * self.base_volume_factor
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FarmerBilling {
    pub farmer: FarmerId,
    pub assessed_area_sqm: f64,
    pub base_fee: f64,
    pub base_volume_m3: f64,
    pub overage_volume_m3: f64,
    pub overage_fee: f64,
    pub total: f64,
}

/// Bill for one farmer. Non-finite or negative inputs count as zero.
pub fn bill_farmer(tariff: &Tariff, farmer: FarmerId, area: f64, usage: f64) -> FarmerBilling {
    let area = guard(area);
    let usage = guard(usage);
    let base_fee = area * tariff.area_rate;
    let base_volume = tariff.base_volume(area);
    let overage_volume = (usage - base_volume).max(0.0);
    let overage_fee = overage_volume * tariff.overage_rate;
    FarmerBilling {
        farmer,
        assessed_area_sqm: area,
        base_fee,
        base_volume_m3: base_volume,
        overage_volume_m3: overage_volume,
        overage_fee,
        total: base_fee + overage_fee,
    }
}

/// Bills for every farmer with owned area > 0 or usage > 0.
///
/// Area is the sum of `Parcel::billing_area` over the farmer's parcels.
/// Farmers with usage but no area are billed overage only; farmers with
/// neither have no record.
pub fn calculate_billing<G: GeometryOps + ?Sized>(
    ops: &G,
    tariff: &Tariff,
    parcels: &[Parcel],
    usage: &BTreeMap<FarmerId, f64>,
) -> BTreeMap<FarmerId, FarmerBilling> {
    let mut area: BTreeMap<&FarmerId, f64> = BTreeMap::new();
    for parcel in parcels {
        if let Some(farmer) = &parcel.farmer {
            *area.entry(farmer).or_insert(0.0) += guard(parcel.billing_area(ops));
        }
    }

    let mut bills = BTreeMap::new();
    for (farmer, a) in area.into_iter().filter(|(_, a)| *a > 0.0) {
        let u = usage.get(farmer).copied().unwrap_or(0.0);
        bills.insert(farmer.clone(), bill_farmer(tariff, farmer.clone(), a, u));
    }
    for (farmer, u) in usage {
        if bills.contains_key(farmer) || guard(*u) <= 0.0 {
            continue;
        }
        bills.insert(farmer.clone(), bill_farmer(tariff, farmer.clone(), 0.0, *u));
    }
    bills
}

#[inline]
fn guard(x: f64) -> f64 {
    if x.is_finite() && x > 0.0 {
        x
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn two_tier_with_overage() {
        let b = bill_farmer(&Tariff::default(), FarmerId::from("a"), 1000.0, 400.0);
        assert!(close(b.base_fee, 2000.0));
        assert!(close(b.base_volume_m3, 312.0));
        assert!(close(b.overage_volume_m3, 88.0));
        assert!(close(b.overage_fee, 1320.0));
        assert!(close(b.total, 3320.0));
    }

    #[test]
    fn usage_without_area_is_all_overage() {
        let b = bill_farmer(&Tariff::default(), FarmerId::from("a"), 0.0, 50.0);
        assert_eq!(b.base_fee, 0.0);
        assert_eq!(b.base_volume_m3, 0.0);
        assert!(close(b.overage_volume_m3, 50.0));
        assert!(close(b.overage_fee, 750.0));
        assert!(close(b.total, 750.0));
    }

    #[test]
    fn usage_within_allotment_has_no_overage() {
        let b = bill_farmer(&Tariff::default(), FarmerId::from("a"), 1000.0, 100.0);
        assert_eq!(b.overage_volume_m3, 0.0);
        assert!(close(b.total, 2000.0));
        let bad = bill_farmer(&Tariff::default(), FarmerId::from("a"), f64::NAN, -3.0);
        assert_eq!(bad.total, 0.0);
    }

    #[test]
    fn tariff_loads_partial_json() {
        let t: Tariff = serde_json::from_str(r#"{"overageRate": 20}"#).unwrap();
        assert_eq!(t.overage_rate, 20.0);
        assert_eq!(t.area_rate, 2.0);
    }
}
