//! Coverage Partitioner: incremental overlay of owned parcels onto a footprint.
//!
//! Model
//! - Keep a list of mutually disjoint cells, each tagged with the farmers whose
//!   parcels cover it. Each owned parcel clips against the footprint, then
//!   carves its overlap out of every existing cell it touches: the shared part
//!   becomes a new cell tagged with both tag sets, the rest of the parcel's
//!   overlap becomes a cell tagged with the parcel's farmer alone.
//! - Cost is O(parcels × cells) boolean operations. Scale is tens of parcels
//!   per footprint; a sweep-line subdivision is not worth its complexity here.
//!
//! A cell may consist of several disconnected pieces with the same tag set; it
//! is still one allocation unit.

use std::collections::BTreeSet;

use tracing::debug;

use crate::cfg::EPS;
use crate::geom::{GeometryOps, Shape};
use crate::model::{FarmerId, Parcel};

/// Disjoint sub-region of a footprint with the farmers whose parcels cover it.
///
/// Invariant: `farmers` is non-empty (sets are deduplicated and ordered by id).
#[derive(Clone, Debug, PartialEq)]
pub struct CoverageCell {
    pub shape: Shape,
    pub farmers: BTreeSet<FarmerId>,
}

/// Partition `footprint` into coverage cells using every parcel with an owner.
///
/// Cells with area `<= EPS` after all parcels are processed are dropped as noise.
pub fn partition_footprint<G: GeometryOps + ?Sized>(
    ops: &G,
    footprint: &Shape,
    parcels: &[Parcel],
) -> Vec<CoverageCell> {
    let mut cells: Vec<CoverageCell> = Vec::new();

    for parcel in parcels {
        let Some(farmer) = &parcel.farmer else {
            continue;
        };
        let mut remaining = ops.intersect(footprint, &parcel.shape());
        if remaining.is_empty() {
            continue;
        }

        let mut next: Vec<CoverageCell> = Vec::with_capacity(cells.len() + 2);
        for mut cell in cells {
            let shared = ops.intersect(&cell.shape, &remaining);
            if shared.is_empty() {
                next.push(cell);
                continue;
            }
            remaining = ops.difference(&remaining, &shared);
            let mut farmers = cell.farmers.clone();
            farmers.insert(farmer.clone());
            cell.shape = ops.difference(&cell.shape, &shared);
            if !cell.shape.is_empty() {
                next.push(cell);
            }
            next.push(CoverageCell {
                shape: shared,
                farmers,
            });
        }
        if !remaining.is_empty() {
            next.push(CoverageCell {
                shape: remaining,
                farmers: BTreeSet::from([farmer.clone()]),
            });
        }
        cells = next;
    }

    let before = cells.len();
    cells.retain(|c| ops.area(&c.shape) > EPS);
    debug!(cells = cells.len(), dropped = before - cells.len(), "partition");
    cells
}
