//! Curated surface for the CLI and experiments.
//!
//! Groups the entry points a driver needs: ingest a document, run the
//! pipeline, apply computed shares, export.

// Pipeline
pub use crate::alloc::{
    aggregate_recorded_usage, aggregate_usage, apply_computed_shares, bill_farmer,
    build_footprints, calculate_billing, compute_faucet_shares, partition_footprint, run,
    shares_from_cells, AllocCfg, Allocation, RecalcMode, Tariff, UsageBasis,
};
// Interchange
pub use crate::document::{
    document_from_dataset, parse_document, serialize_document, validate, Document,
    DocumentError,
};
// Geometry backends
pub use crate::geom::{GeometryOps, Planar, Shape, Wgs84};
// Synthetic scenarios
pub use crate::synth::{draw_scenario, ReplayToken as ScenarioReplay, ScenarioCfg};
