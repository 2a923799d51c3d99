//! `GeometryOps`: the primitive layer consumed by the allocation engine.

use geo::{
    Area, BooleanOps, BoundingRect, ChamberlainDuquetteArea, Coord, LineString, MapCoords,
    MultiPolygon, Point, Polygon,
};

use super::Shape;
use crate::cfg::EPS;

/// Mean earth radius (meters) used for circle construction on the sphere.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Boolean operation kind passed to `GeometryOps::overlay`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlay {
    Union,
    Intersection,
    Difference,
}

impl Overlay {
    fn apply(self, x: &MultiPolygon<f64>, y: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        match self {
            Overlay::Union => x.union(y),
            Overlay::Intersection => x.intersection(y),
            Overlay::Difference => x.difference(y),
        }
    }
}

/// Geometry primitives over `Shape`.
///
/// Boolean operations return `Shape::Empty` for a no-overlap result; they never fail.
/// Implementors supply the metric (`area`, `circle`). The default `overlay` clips
/// in the coordinate plane; backends with angular coordinates override it.
pub trait GeometryOps: Sync {
    /// Unsigned area of `shape` in the backend's units. Independent of ring winding.
    fn area(&self, shape: &Shape) -> f64;

    /// Closed `steps`-gon approximating a circle of `radius` around `center`.
    /// A non-positive or non-finite radius yields `Shape::Empty`.
    fn circle(&self, center: Point<f64>, radius: f64, steps: usize) -> Shape;

    /// Clip two non-empty operands. Result pieces of area `<= EPS` are dropped,
    /// so clipping noise never survives as a stray polygon.
    fn overlay(&self, op: Overlay, x: &MultiPolygon<f64>, y: &MultiPolygon<f64>) -> Shape {
        Shape::from_multi(drop_slivers(op.apply(x, y)))
    }

    fn union(&self, a: &Shape, b: &Shape) -> Shape {
        match (a, b) {
            (Shape::Empty, _) => b.clone(),
            (_, Shape::Empty) => a.clone(),
            (Shape::Area(x), Shape::Area(y)) => self.overlay(Overlay::Union, x, y),
        }
    }

    fn intersect(&self, a: &Shape, b: &Shape) -> Shape {
        match (a, b) {
            (Shape::Area(x), Shape::Area(y)) => self.overlay(Overlay::Intersection, x, y),
            _ => Shape::Empty,
        }
    }

    fn difference(&self, subject: &Shape, clip: &Shape) -> Shape {
        match (subject, clip) {
            (Shape::Empty, _) => Shape::Empty,
            (_, Shape::Empty) => subject.clone(),
            (Shape::Area(x), Shape::Area(y)) => self.overlay(Overlay::Difference, x, y),
        }
    }
}

/// WGS84 lon/lat degrees; areas in m², radii in meters.
///
/// Clipping runs in a local equirectangular frame (meters) centered on the
/// operands, then maps back to degrees.
#[derive(Clone, Copy, Debug, Default)]
pub struct Wgs84;

impl GeometryOps for Wgs84 {
    fn area(&self, shape: &Shape) -> f64 {
        match shape {
            Shape::Empty => 0.0,
            Shape::Area(mp) => mp.chamberlain_duquette_unsigned_area(),
        }
    }

    fn circle(&self, center: Point<f64>, radius: f64, steps: usize) -> Shape {
        if !(radius.is_finite() && radius > 0.0) {
            return Shape::Empty;
        }
        let steps = steps.max(3);
        let ring: Vec<Coord<f64>> = (0..steps)
            .map(|i| {
                let bearing = -360.0 * i as f64 / steps as f64;
                sphere_destination(center, bearing, radius)
            })
            .collect();
        Shape::from_polygon(Polygon::new(LineString(ring), vec![]))
    }

    fn overlay(&self, op: Overlay, x: &MultiPolygon<f64>, y: &MultiPolygon<f64>) -> Shape {
        let Some(frame) = LocalFrame::around(x, y) else {
            return Shape::from_multi(op.apply(x, y));
        };
        let clipped = drop_slivers(op.apply(&frame.forward(x), &frame.forward(y)));
        Shape::from_multi(frame.inverse(&clipped))
    }
}

/// Euclidean plane; areas and radii in coordinate units.
#[derive(Clone, Copy, Debug, Default)]
pub struct Planar;

impl GeometryOps for Planar {
    fn area(&self, shape: &Shape) -> f64 {
        match shape {
            Shape::Empty => 0.0,
            Shape::Area(mp) => mp.unsigned_area(),
        }
    }

    fn circle(&self, center: Point<f64>, radius: f64, steps: usize) -> Shape {
        if !(radius.is_finite() && radius > 0.0) {
            return Shape::Empty;
        }
        let steps = steps.max(3);
        let ring: Vec<Coord<f64>> = (0..steps)
            .map(|i| {
                let th = std::f64::consts::TAU * i as f64 / steps as f64;
                Coord {
                    x: center.x() + radius * th.cos(),
                    y: center.y() + radius * th.sin(),
                }
            })
            .collect();
        Shape::from_polygon(Polygon::new(LineString(ring), vec![]))
    }
}

/// Equirectangular projection around `(lon0, lat0)`, in meters.
#[derive(Clone, Copy, Debug)]
struct LocalFrame {
    lon0: f64,
    lat0: f64,
    kx: f64,
    ky: f64,
}

impl LocalFrame {
    /// Frame centered on the joint bounding box; `None` if either operand has no extent.
    fn around(x: &MultiPolygon<f64>, y: &MultiPolygon<f64>) -> Option<Self> {
        let a = x.bounding_rect()?;
        let b = y.bounding_rect()?;
        let lon0 = (a.min().x.min(b.min().x) + a.max().x.max(b.max().x)) / 2.0;
        let lat0 = (a.min().y.min(b.min().y) + a.max().y.max(b.max().y)) / 2.0;
        let ky = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
        let kx = ky * lat0.to_radians().cos().max(1e-9);
        Some(Self { lon0, lat0, kx, ky })
    }

    fn forward(self, mp: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        mp.map_coords(move |c| Coord {
            x: (c.x - self.lon0) * self.kx,
            y: (c.y - self.lat0) * self.ky,
        })
    }

    fn inverse(self, mp: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        mp.map_coords(move |c| Coord {
            x: self.lon0 + c.x / self.kx,
            y: self.lat0 + c.y / self.ky,
        })
    }
}

fn drop_slivers(mp: MultiPolygon<f64>) -> MultiPolygon<f64> {
    MultiPolygon(mp.0.into_iter().filter(|p| p.unsigned_area() > EPS).collect())
}

/// Great-circle destination from `origin` (lon/lat degrees) along `bearing_deg`.
fn sphere_destination(origin: Point<f64>, bearing_deg: f64, distance_m: f64) -> Coord<f64> {
    let lon1 = origin.x().to_radians();
    let lat1 = origin.y().to_radians();
    let bearing = bearing_deg.to_radians();
    let delta = distance_m / EARTH_RADIUS_M;
    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());
    Coord {
        x: lon2.to_degrees(),
        y: lat2.to_degrees(),
    }
}
