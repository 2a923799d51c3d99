use geo::{Point, Polygon};

use super::ids::{FarmerId, ParcelId, SprinklerId, SupplyPointId};
use crate::geom::{GeometryOps, Shape};

#[derive(Clone, Debug, PartialEq)]
pub struct Farmer {
    pub id: FarmerId,
    pub name: String,
    pub notes: Option<String>,
}

/// A recorded share on a supply point.
///
/// `share` is user-editable; `computed` is the snapshot written by the last
/// recalculation. Recalculation never has to touch `share` (see `RecalcMode`).
#[derive(Clone, Debug, PartialEq)]
pub struct FarmerShare {
    pub farmer_id: FarmerId,
    pub share: f64,
    pub computed: Option<f64>,
}

/// Water supply point ("faucet").
#[derive(Clone, Debug, PartialEq)]
pub struct SupplyPoint {
    pub id: SupplyPointId,
    pub name: String,
    pub location: Point<f64>,
    /// Annual draw in m³ (≥ 0).
    pub annual_draw_m3: f64,
    pub shares: Vec<FarmerShare>,
}

impl SupplyPoint {
    /// Draw guarded to a usable value: non-finite or negative counts as zero.
    #[inline]
    pub fn effective_draw(&self) -> f64 {
        if self.annual_draw_m3.is_finite() && self.annual_draw_m3 > 0.0 {
            self.annual_draw_m3
        } else {
            0.0
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sprinkler {
    pub id: SprinklerId,
    pub name: String,
    pub location: Point<f64>,
    pub supply_point: Option<SupplyPointId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Parcel {
    pub id: ParcelId,
    pub name: String,
    pub polygon: Polygon<f64>,
    pub farmer: Option<FarmerId>,
    /// Authoritative billing area; geometry is only the fallback.
    pub assessed_area_sqm: Option<f64>,
}

impl Parcel {
    #[inline]
    pub fn shape(&self) -> Shape {
        Shape::from_polygon(self.polygon.clone())
    }

    /// Assessed area if present (negative guarded to zero), else geometric area.
    pub fn billing_area<G: GeometryOps + ?Sized>(&self, ops: &G) -> f64 {
        match self.assessed_area_sqm {
            Some(a) if a.is_finite() => a.max(0.0),
            _ => ops.area(&self.shape()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: f64,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: [24.8055, 125.2941],
            zoom: 12.0,
        }
    }
}
