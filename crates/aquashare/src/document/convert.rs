//! Document ⇄ `Dataset`.

use geo::{LineString, Point, Polygon};
use tracing::debug;

use super::error::DocumentError;
use super::schema::{
    check_version, validate, Document, FarmerDoc, FarmerShareDoc, FaucetDoc, MapViewDoc, Meta,
    ParcelDoc, PointFeature, PolygonFeature, SprinklerDoc,
};
use crate::cfg::SCHEMA_VERSION;
use crate::geom::{GeometryOps, Shape};
use crate::model::{
    Dataset, Farmer, FarmerId, FarmerShare, MapView, Parcel, ParcelId, Sprinkler, SprinklerId,
    SupplyPoint, SupplyPointId,
};

/// Parse, validate and ingest a JSON document.
///
/// `ops` supplies the area used when a parcel has no `assessedAreaSqm`.
pub fn parse_document<G: GeometryOps + ?Sized>(
    json: &str,
    ops: &G,
) -> Result<Dataset, DocumentError> {
    let mut raw: serde_json::Value = serde_json::from_str(json)?;
    check_version(&mut raw)?;
    let doc: Document = serde_json::from_value(raw)?;
    validate(&doc)?;
    let ds = to_dataset(doc, ops);
    debug!(
        farmers = ds.farmers.len(),
        supply_points = ds.supply_points.len(),
        sprinklers = ds.sprinklers.len(),
        parcels = ds.parcels.len(),
        "document ingested"
    );
    Ok(ds)
}

/// Convert a validated document, applying the ingest defaults.
pub fn to_dataset<G: GeometryOps + ?Sized>(doc: Document, ops: &G) -> Dataset {
    Dataset {
        map: MapView {
            center: doc.map.center,
            zoom: doc.map.zoom,
        },
        farmers: doc
            .farmers
            .into_iter()
            .map(|f| Farmer {
                id: FarmerId(f.id),
                name: f.name,
                notes: f.notes,
            })
            .collect(),
        supply_points: doc
            .faucets
            .into_iter()
            .map(|f| SupplyPoint {
                id: SupplyPointId(f.id),
                name: f.name,
                location: to_point(&f.geometry),
                annual_draw_m3: f.annual_water_usage_m3,
                shares: f
                    .farmer_shares
                    .into_iter()
                    .map(|s| FarmerShare {
                        farmer_id: FarmerId(s.farmer_id),
                        share: s.share,
                        computed: Some(s.computed_share.unwrap_or(s.share)),
                    })
                    .collect(),
            })
            .collect(),
        sprinklers: doc
            .sprinklers
            .into_iter()
            .map(|s| Sprinkler {
                id: SprinklerId(s.id),
                name: s.name,
                location: to_point(&s.geometry),
                supply_point: s.faucet_id.map(SupplyPointId),
            })
            .collect(),
        parcels: doc
            .parcels
            .into_iter()
            .map(|p| {
                let polygon = to_polygon(&p.geometry);
                let assessed = p
                    .assessed_area_sqm
                    .unwrap_or_else(|| ops.area(&Shape::from_polygon(polygon.clone())));
                Parcel {
                    id: ParcelId(p.id),
                    name: p.name,
                    polygon,
                    farmer: p.farmer_id.map(FarmerId),
                    assessed_area_sqm: Some(assessed),
                }
            })
            .collect(),
    }
}

/// Document for `dataset` with the given export timestamp.
pub fn document_from_dataset(dataset: &Dataset, exported_at: Option<String>) -> Document {
    Document {
        meta: Meta {
            schema_version: SCHEMA_VERSION,
            exported_at,
        },
        map: MapViewDoc {
            center: dataset.map.center,
            zoom: dataset.map.zoom,
        },
        farmers: dataset
            .farmers
            .iter()
            .map(|f| FarmerDoc {
                id: f.id.0.clone(),
                name: f.name.clone(),
                notes: f.notes.clone(),
            })
            .collect(),
        faucets: dataset
            .supply_points
            .iter()
            .map(|s| FaucetDoc {
                id: s.id.0.clone(),
                name: s.name.clone(),
                geometry: PointFeature::new([s.location.x(), s.location.y()]),
                annual_water_usage_m3: s.annual_draw_m3,
                farmer_shares: s
                    .shares
                    .iter()
                    .map(|sh| FarmerShareDoc {
                        farmer_id: sh.farmer_id.0.clone(),
                        share: sh.share,
                        computed_share: sh.computed,
                    })
                    .collect(),
            })
            .collect(),
        sprinklers: dataset
            .sprinklers
            .iter()
            .map(|s| SprinklerDoc {
                id: s.id.0.clone(),
                name: s.name.clone(),
                geometry: PointFeature::new([s.location.x(), s.location.y()]),
                faucet_id: s.supply_point.as_ref().map(|id| id.0.clone()),
            })
            .collect(),
        parcels: dataset
            .parcels
            .iter()
            .map(|p| ParcelDoc {
                id: p.id.0.clone(),
                name: p.name.clone(),
                geometry: PolygonFeature::new(polygon_rings(&p.polygon)),
                farmer_id: p.farmer.as_ref().map(|id| id.0.clone()),
                assessed_area_sqm: p.assessed_area_sqm,
            })
            .collect(),
    }
}

/// Pretty JSON export stamped with the current UTC time.
pub fn serialize_document(dataset: &Dataset) -> Result<String, DocumentError> {
    let doc = document_from_dataset(dataset, Some(chrono::Utc::now().to_rfc3339()));
    Ok(serde_json::to_string_pretty(&doc)?)
}

fn to_point(f: &PointFeature) -> Point<f64> {
    let [x, y] = f.geometry.coordinates;
    Point::new(x, y)
}

fn to_polygon(f: &PolygonFeature) -> Polygon<f64> {
    let mut rings = f
        .geometry
        .coordinates
        .iter()
        .map(|r| LineString::from(r.clone()));
    let exterior = rings.next().unwrap_or_else(|| LineString(Vec::new()));
    Polygon::new(exterior, rings.collect())
}

fn polygon_rings(p: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(p.exterior())
        .chain(p.interiors())
        .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
        .collect()
}
