//! Geometry adapter over the `geo` crate.
//!
//! Purpose
//! - Give the allocation engine one small seam (`GeometryOps`) for union,
//!   intersection, difference, area and circles, so the engine never touches
//!   polygon clipping directly.
//! - Make "no area" an explicit value (`Shape::Empty`) instead of a multi-polygon
//!   that happens to hold zero or degenerate rings.
//!
//! Backends
//! - `Wgs84`: lon/lat degrees, spherical area in m² (Chamberlain-Duquette,
//!   independent of ring winding), circles by great-circle destination with the
//!   radius in meters.
//! - `Planar`: Euclidean area and circles in coordinate units. Used by tests
//!   and by callers holding already-projected data.
//!
//! Boolean operations go through `GeometryOps::overlay`. `Planar` clips in the
//! coordinate plane; `Wgs84` clips in a local metric frame around the operands.
//! Either way, result pieces with area `<= EPS` are dropped.

mod backend;
mod shape;

pub use backend::{GeometryOps, Overlay, Planar, Wgs84, EARTH_RADIUS_M};
pub use shape::Shape;
