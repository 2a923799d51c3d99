//! `Shape`: a multi-polygon with an explicit empty sentinel.

use geo::{Coord, LineString, MultiPolygon, Polygon};

/// Area-bearing geometry, or nothing.
///
/// Invariant: `Area` always holds at least one polygon whose exterior ring has
/// three or more distinct points. Constructors normalize degenerate rings away
/// and fall back to `Empty`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Shape {
    #[default]
    Empty,
    Area(MultiPolygon<f64>),
}

impl Shape {
    /// Normalize a raw multi-polygon (as returned by clipping) into a `Shape`.
    pub fn from_multi(mp: MultiPolygon<f64>) -> Self {
        let kept: Vec<Polygon<f64>> = mp
            .0
            .into_iter()
            .filter(|p| ring_is_proper(p.exterior()))
            .map(|p| {
                let (exterior, interiors) = p.into_inner();
                let interiors = interiors.into_iter().filter(ring_is_proper).collect();
                Polygon::new(exterior, interiors)
            })
            .collect();
        if kept.is_empty() {
            Shape::Empty
        } else {
            Shape::Area(MultiPolygon(kept))
        }
    }

    pub fn from_polygon(p: Polygon<f64>) -> Self {
        Self::from_multi(MultiPolygon(vec![p]))
    }

    /// Build from coordinate rings: the first ring is the exterior, the rest are holes.
    /// Rings may be open or closed.
    pub fn from_rings(rings: &[Vec<[f64; 2]>]) -> Self {
        let Some((exterior, holes)) = rings.split_first() else {
            return Shape::Empty;
        };
        let exterior = LineString::from(exterior.clone());
        let holes = holes.iter().map(|r| LineString::from(r.clone())).collect();
        Self::from_polygon(Polygon::new(exterior, holes))
    }

    /// Axis-aligned rectangle; handy for tests and synthetic parcels.
    pub fn rect(min: [f64; 2], max: [f64; 2]) -> Self {
        Self::from_rings(&[vec![
            [min[0], min[1]],
            [max[0], min[1]],
            [max[0], max[1]],
            [min[0], max[1]],
        ]])
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Shape::Empty)
    }

    #[inline]
    pub fn as_multi(&self) -> Option<&MultiPolygon<f64>> {
        match self {
            Shape::Empty => None,
            Shape::Area(mp) => Some(mp),
        }
    }

    /// Number of disjoint polygon pieces (0 for `Empty`).
    pub fn piece_count(&self) -> usize {
        self.as_multi().map_or(0, |mp| mp.0.len())
    }

    /// Closed coordinate rings per polygon, exterior first.
    pub fn to_rings(&self) -> Vec<Vec<Vec<[f64; 2]>>> {
        let Some(mp) = self.as_multi() else {
            return Vec::new();
        };
        mp.0.iter()
            .map(|p| {
                std::iter::once(p.exterior())
                    .chain(p.interiors())
                    .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
                    .collect()
            })
            .collect()
    }
}

impl From<Polygon<f64>> for Shape {
    fn from(p: Polygon<f64>) -> Self {
        Shape::from_polygon(p)
    }
}

impl From<MultiPolygon<f64>> for Shape {
    fn from(mp: MultiPolygon<f64>) -> Self {
        Shape::from_multi(mp)
    }
}

/// At least three distinct consecutive points, ignoring the closing point.
fn ring_is_proper(ring: &LineString<f64>) -> bool {
    let mut pts: Vec<Coord<f64>> = ring.0.clone();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    pts.dedup();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    pts.len() >= 3 && pts.iter().all(|c| c.x.is_finite() && c.y.is_finite())
}
