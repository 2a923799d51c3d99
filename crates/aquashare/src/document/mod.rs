//! Versioned JSON interchange documents.
//!
//! Purpose
//! - Parse and validate import documents before any entity reaches the engine;
//!   the engine itself assumes well-formed entities.
//! - Export a `Dataset` in the same shape, stamped with the export time.
//!
//! Wire format
//! - camelCase keys; `meta.schemaVersion` must equal `cfg::SCHEMA_VERSION`.
//! - Point and polygon geometries are GeoJSON `Feature` objects.
//! - On ingest, a missing `assessedAreaSqm` is derived from the polygon and a
//!   missing `computedShare` defaults to the recorded `share`.

mod convert;
mod error;
mod schema;

pub use convert::{document_from_dataset, parse_document, serialize_document, to_dataset};
pub use error::DocumentError;
pub use schema::{
    validate, Document, FaucetDoc, FarmerDoc, FarmerShareDoc, MapViewDoc, Meta, ParcelDoc,
    PointFeature, PolygonFeature, SprinklerDoc,
};

#[cfg(test)]
mod tests;
