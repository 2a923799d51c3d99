use super::*;
use crate::geom::Planar;
use crate::model::{FarmerId, ParcelId, SupplyPointId};

const SAMPLE: &str = r#"{
  "meta": { "schemaVersion": 1, "exportedAt": "2024-05-01T00:00:00Z" },
  "map": { "center": [24.8055, 125.2941], "zoom": 12 },
  "farmers": [
    { "id": "far-1", "name": "Higa" },
    { "id": "far-2", "name": "Arakaki", "notes": "east field" }
  ],
  "faucets": [
    {
      "id": "fct-1",
      "name": "North",
      "geometry": { "type": "Feature", "geometry": { "type": "Point", "coordinates": [0.0, 0.0] } },
      "annualWaterUsageM3": 1200,
      "farmerShares": [ { "farmerId": "far-1", "share": 0.6 }, { "farmerId": "far-2", "share": 0.4, "computedShare": 0.5 } ]
    }
  ],
  "sprinklers": [
    {
      "id": "spr-1",
      "name": "S1",
      "geometry": { "type": "Feature", "geometry": { "type": "Point", "coordinates": [0.0, 0.0] }, "properties": null },
      "faucetId": "fct-1"
    },
    {
      "id": "spr-2",
      "name": "S2",
      "geometry": { "type": "Feature", "geometry": { "type": "Point", "coordinates": [5.0, 0.0] }, "properties": {} }
    }
  ],
  "parcels": [
    {
      "id": "par-1",
      "name": "P1",
      "geometry": { "type": "Feature", "geometry": { "type": "Polygon", "coordinates": [[[0,0],[4,0],[4,2],[0,2],[0,0]]] } },
      "farmerId": "far-1"
    },
    {
      "id": "par-2",
      "name": "P2",
      "geometry": { "type": "Feature", "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]] } },
      "assessedAreaSqm": 300
    }
  ]
}"#;

fn with(patch: impl FnOnce(&mut serde_json::Value)) -> String {
    let mut v: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
    patch(&mut v);
    v.to_string()
}

#[test]
fn parses_and_applies_ingest_defaults() {
    let ds = parse_document(SAMPLE, &Planar).expect("valid document");
    assert_eq!(ds.farmers.len(), 2);
    assert_eq!(ds.farmers[1].notes.as_deref(), Some("east field"));
    let sp = ds.supply_point(&SupplyPointId::from("fct-1")).unwrap();
    assert_eq!(sp.annual_draw_m3, 1200.0);
    assert_eq!(sp.shares[0].computed, Some(0.6));
    assert_eq!(sp.shares[1].computed, Some(0.5));
    assert_eq!(ds.sprinklers[1].supply_point, None);
    // Missing assessed area derived from geometry.
    let p1 = ds.parcel(&ParcelId::from("par-1")).unwrap();
    assert_eq!(p1.assessed_area_sqm, Some(8.0));
    assert_eq!(p1.farmer, Some(FarmerId::from("far-1")));
    let p2 = ds.parcel(&ParcelId::from("par-2")).unwrap();
    assert_eq!(p2.assessed_area_sqm, Some(300.0));
    assert_eq!(p2.farmer, None);
}

#[test]
fn rejects_other_schema_versions() {
    let doc = with(|v| v["meta"]["schemaVersion"] = 2.into());
    let err = parse_document(&doc, &Planar).unwrap_err();
    assert!(matches!(err, DocumentError::UnsupportedVersion { .. }), "{err}");

    let doc = with(|v| v["meta"]["schemaVersion"] = "1".into());
    assert!(matches!(
        parse_document(&doc, &Planar),
        Err(DocumentError::UnsupportedVersion { .. })
    ));

    let doc = with(|v| {
        v["meta"].as_object_mut().unwrap().remove("schemaVersion");
    });
    assert!(matches!(
        parse_document(&doc, &Planar),
        Err(DocumentError::Invalid { .. })
    ));
}

#[test]
fn rejects_short_rings() {
    let doc = with(|v| {
        v["parcels"][0]["geometry"]["geometry"]["coordinates"] =
            serde_json::json!([[[0, 0], [1, 0], [0, 0]]]);
    });
    match parse_document(&doc, &Planar) {
        Err(DocumentError::Invalid { path, .. }) => {
            assert_eq!(path, "parcels[0].geometry.coordinates[0]")
        }
        other => panic!("expected invalid ring, got {other:?}"),
    }
}

#[test]
fn rejects_out_of_range_fields() {
    let cases = [
        with(|v| v["map"]["zoom"] = 23.into()),
        with(|v| v["farmers"][0]["name"] = "".into()),
        with(|v| v["faucets"][0]["farmerShares"][0]["share"] = 1.5.into()),
        with(|v| v["faucets"][0]["farmerShares"][1]["computedShare"] = (-0.1).into()),
        with(|v| v["faucets"][0]["annualWaterUsageM3"] = (-1).into()),
        with(|v| v["parcels"][1]["assessedAreaSqm"] = (-3).into()),
    ];
    for doc in cases {
        assert!(
            matches!(parse_document(&doc, &Planar), Err(DocumentError::Invalid { .. })),
            "accepted {doc}"
        );
    }
}

#[test]
fn rejects_missing_fields_and_wrong_geometry() {
    let doc = with(|v| {
        v["faucets"][0].as_object_mut().unwrap().remove("farmerShares");
    });
    assert!(matches!(
        parse_document(&doc, &Planar),
        Err(DocumentError::Json(_))
    ));
    let doc = with(|v| v["sprinklers"][0]["geometry"]["geometry"]["type"] = "Polygon".into());
    assert!(matches!(
        parse_document(&doc, &Planar),
        Err(DocumentError::Json(_))
    ));
    assert!(matches!(
        parse_document("not json", &Planar),
        Err(DocumentError::Json(_))
    ));
}

#[test]
fn export_round_trips() {
    let ds = parse_document(SAMPLE, &Planar).unwrap();
    let doc = document_from_dataset(&ds, Some("2024-05-02T00:00:00Z".into()));
    assert_eq!(doc.meta.schema_version, 1);
    let json = serde_json::to_string(&doc).unwrap();
    assert!(json.contains("\"annualWaterUsageM3\""));
    assert!(json.contains("\"type\":\"Feature\""));
    let back = parse_document(&json, &Planar).unwrap();
    assert_eq!(back, ds);

    let stamped = serialize_document(&ds).unwrap();
    let v: serde_json::Value = serde_json::from_str(&stamped).unwrap();
    assert!(v["meta"]["exportedAt"].as_str().is_some());
}

#[test]
fn float_version_tag_is_accepted() {
    let doc = with(|v| v["meta"]["schemaVersion"] = 1.0.into());
    let ds = parse_document(&doc, &Planar).expect("1.0 is version 1");
    assert_eq!(ds, parse_document(SAMPLE, &Planar).unwrap());
    let doc = with(|v| v["meta"]["schemaVersion"] = 1.5.into());
    assert!(matches!(
        parse_document(&doc, &Planar),
        Err(DocumentError::UnsupportedVersion { .. })
    ));
}

#[test]
fn feature_properties_must_be_an_object() {
    let doc = with(|v| v["parcels"][0]["geometry"]["properties"] = serde_json::json!({"k": 1}));
    assert!(parse_document(&doc, &Planar).is_ok());
    for bad in [serde_json::json!("label"), serde_json::json!([1, 2]), serde_json::json!(3)] {
        let doc = with(|v| v["sprinklers"][0]["geometry"]["properties"] = bad.clone());
        assert!(
            matches!(parse_document(&doc, &Planar), Err(DocumentError::Json(_))),
            "accepted {doc}"
        );
    }
}
