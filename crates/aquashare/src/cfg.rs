//! Tolerances and defaults shared by the allocation pipeline.
//!
//! Policy
//! - One epsilon for "effectively empty", "effectively equal" and "effectively
//!   covers". It is expressed in the units of the area primitive in use
//!   (m² for `Wgs84`, squared coordinate units for `Planar`).

/// Area (and share) tolerance used uniformly across partition and shares.
pub const EPS: f64 = 1e-6;
/// Share fractions are reported at this many decimal digits.
pub const SHARE_DECIMALS: u32 = 6;
/// `10^SHARE_DECIMALS`; shares are apportioned in these integer units.
pub(crate) const SHARE_UNITS: u64 = 1_000_000;
/// Sprinkler coverage radius in meters.
pub const DEFAULT_RADIUS_M: f64 = 30.0;
/// Segment count of the circle approximation around each sprinkler.
pub const DEFAULT_CIRCLE_STEPS: usize = 64;
/// The only accepted interchange document version.
pub const SCHEMA_VERSION: u32 = 1;
