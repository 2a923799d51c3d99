//! Serde model of the interchange document and its validation rules.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::DocumentError;
use crate::cfg::SCHEMA_VERSION;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub meta: Meta,
    pub map: MapViewDoc,
    pub farmers: Vec<FarmerDoc>,
    pub faucets: Vec<FaucetDoc>,
    pub sprinklers: Vec<SprinklerDoc>,
    pub parcels: Vec<ParcelDoc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapViewDoc {
    pub center: [f64; 2],
    pub zoom: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FarmerDoc {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerShareDoc {
    pub farmer_id: String,
    pub share: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_share: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaucetDoc {
    pub id: String,
    pub name: String,
    pub geometry: PointFeature,
    pub annual_water_usage_m3: f64,
    pub farmer_shares: Vec<FarmerShareDoc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprinklerDoc {
    pub id: String,
    pub name: String,
    pub geometry: PointFeature,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faucet_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelDoc {
    pub id: String,
    pub name: String,
    pub geometry: PolygonFeature,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farmer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessed_area_sqm: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureTag {
    Feature,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointTag {
    Point,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolygonTag {
    Polygon,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: PointTag,
    pub coordinates: [f64; 2],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolygonGeometry {
    #[serde(rename = "type")]
    pub kind: PolygonTag,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

/// GeoJSON point feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointFeature {
    #[serde(rename = "type")]
    pub kind: FeatureTag,
    pub geometry: PointGeometry,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

impl PointFeature {
    pub fn new(coordinates: [f64; 2]) -> Self {
        Self {
            kind: FeatureTag::Feature,
            geometry: PointGeometry {
                kind: PointTag::Point,
                coordinates,
            },
            properties: None,
        }
    }
}

/// GeoJSON polygon feature; the first ring is the exterior.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolygonFeature {
    #[serde(rename = "type")]
    pub kind: FeatureTag,
    pub geometry: PolygonGeometry,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

impl PolygonFeature {
    pub fn new(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Self {
            kind: FeatureTag::Feature,
            geometry: PolygonGeometry {
                kind: PolygonTag::Polygon,
                coordinates: rings,
            },
            properties: None,
        }
    }
}

/// Check the version tag on raw JSON before the typed parse.
///
/// Any JSON number equal to the supported version passes (`1` and `1.0`); the
/// tag is rewritten as an integer for the typed model.
pub(crate) fn check_version(raw: &mut Value) -> Result<(), DocumentError> {
    let found = raw.get_mut("meta").and_then(|m| m.get_mut("schemaVersion"));
    match found {
        Some(v) if v.as_f64() == Some(f64::from(SCHEMA_VERSION)) => {
            *v = Value::from(SCHEMA_VERSION);
            Ok(())
        }
        Some(v) => Err(DocumentError::UnsupportedVersion {
            found: v.to_string(),
            expected: SCHEMA_VERSION,
        }),
        None => Err(DocumentError::invalid("meta.schemaVersion", "missing")),
    }
}

/// Field-level validation of a typed document.
pub fn validate(doc: &Document) -> Result<(), DocumentError> {
    if doc.meta.schema_version != SCHEMA_VERSION {
        return Err(DocumentError::UnsupportedVersion {
            found: doc.meta.schema_version.to_string(),
            expected: SCHEMA_VERSION,
        });
    }
    check_coord("map.center", doc.map.center)?;
    if !(0.0..=22.0).contains(&doc.map.zoom) {
        return Err(DocumentError::invalid("map.zoom", "must be within [0, 22]"));
    }
    for (i, f) in doc.farmers.iter().enumerate() {
        check_name(&format!("farmers[{i}].name"), &f.name)?;
    }
    for (i, f) in doc.faucets.iter().enumerate() {
        let at = format!("faucets[{i}]");
        check_name(&format!("{at}.name"), &f.name)?;
        check_coord(&format!("{at}.geometry"), f.geometry.geometry.coordinates)?;
        if !(f.annual_water_usage_m3.is_finite() && f.annual_water_usage_m3 >= 0.0) {
            return Err(DocumentError::invalid(
                format!("{at}.annualWaterUsageM3"),
                "must be a finite number >= 0",
            ));
        }
        for (j, s) in f.farmer_shares.iter().enumerate() {
            check_fraction(&format!("{at}.farmerShares[{j}].share"), s.share)?;
            if let Some(c) = s.computed_share {
                check_fraction(&format!("{at}.farmerShares[{j}].computedShare"), c)?;
            }
        }
    }
    for (i, s) in doc.sprinklers.iter().enumerate() {
        check_name(&format!("sprinklers[{i}].name"), &s.name)?;
        check_coord(&format!("sprinklers[{i}].geometry"), s.geometry.geometry.coordinates)?;
    }
    for (i, p) in doc.parcels.iter().enumerate() {
        let at = format!("parcels[{i}]");
        check_name(&format!("{at}.name"), &p.name)?;
        let rings = &p.geometry.geometry.coordinates;
        if rings.is_empty() {
            return Err(DocumentError::invalid(format!("{at}.geometry"), "polygon has no rings"));
        }
        for (j, ring) in rings.iter().enumerate() {
            if ring.len() < 4 {
                return Err(DocumentError::invalid(
                    format!("{at}.geometry.coordinates[{j}]"),
                    "polygon rings must contain at least 4 coordinates",
                ));
            }
            for c in ring {
                check_coord(&format!("{at}.geometry.coordinates[{j}]"), *c)?;
            }
        }
        if let Some(a) = p.assessed_area_sqm {
            if !(a.is_finite() && a >= 0.0) {
                return Err(DocumentError::invalid(
                    format!("{at}.assessedAreaSqm"),
                    "must be a finite number >= 0",
                ));
            }
        }
    }
    Ok(())
}

fn check_name(path: &str, name: &str) -> Result<(), DocumentError> {
    if name.is_empty() {
        return Err(DocumentError::invalid(path, "name required"));
    }
    Ok(())
}

fn check_fraction(path: &str, x: f64) -> Result<(), DocumentError> {
    if !(0.0..=1.0).contains(&x) {
        return Err(DocumentError::invalid(path, "must be within [0, 1]"));
    }
    Ok(())
}

fn check_coord(path: &str, c: [f64; 2]) -> Result<(), DocumentError> {
    if !(c[0].is_finite() && c[1].is_finite()) {
        return Err(DocumentError::invalid(path, "non-finite coordinate"));
    }
    Ok(())
}
