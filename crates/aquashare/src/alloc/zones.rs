//! Zone Builder: one coverage footprint per supply point.

use std::collections::BTreeMap;

use tracing::debug;

use crate::geom::{GeometryOps, Shape};
use crate::model::{Sprinkler, SupplyPointId};

/// Fold `shapes` together with `union`. No inputs (or only empty ones) gives `Empty`.
pub fn union_all<G: GeometryOps + ?Sized>(
    ops: &G,
    shapes: impl IntoIterator<Item = Shape>,
) -> Shape {
    shapes
        .into_iter()
        .filter(|s| !s.is_empty())
        .fold(Shape::Empty, |acc, s| ops.union(&acc, &s))
}

/// Footprint per supply point: the union of a `radius` circle around every
/// sprinkler assigned to it.
///
/// Sprinklers without a supply point are ignored. Supply points with no
/// sprinklers (or whose circles are all empty) have no entry.
pub fn build_footprints<G: GeometryOps + ?Sized>(
    ops: &G,
    sprinklers: &[Sprinkler],
    radius: f64,
    steps: usize,
) -> BTreeMap<SupplyPointId, Shape> {
    let mut grouped: BTreeMap<SupplyPointId, Vec<Shape>> = BTreeMap::new();
    for sprinkler in sprinklers {
        let Some(sp) = &sprinkler.supply_point else {
            continue;
        };
        let circle = ops.circle(sprinkler.location, radius, steps);
        grouped.entry(sp.clone()).or_default().push(circle);
    }

    let mut zones = BTreeMap::new();
    for (sp, circles) in grouped {
        let count = circles.len();
        let footprint = union_all(ops, circles);
        if footprint.is_empty() {
            continue;
        }
        debug!(supply_point = %sp, sprinklers = count, pieces = footprint.piece_count(), "footprint");
        zones.insert(sp, footprint);
    }
    zones
}
