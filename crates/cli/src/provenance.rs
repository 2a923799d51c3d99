//! Provenance sidecars for billing tables.
//!
//! A sidecar sits next to the artifact as `<stem>.provenance.json` and pins
//! down what produced it: code revision, crate version, allocation parameters,
//! and each input document by path, SHA-256 digest, schema version and entity
//! counts.

use anyhow::{Context, Result};
use aquashare::cfg::SCHEMA_VERSION;
use aquashare::model::Dataset;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// One ingested document.
pub struct InputDoc {
    pub path: String,
    pub sha256: String,
    pub farmers: usize,
    pub supply_points: usize,
    pub sprinklers: usize,
    pub parcels: usize,
}

impl InputDoc {
    /// `text` is the raw document as read from `path`; `dataset` is its parse.
    pub fn new(path: impl Into<String>, text: &str, dataset: &Dataset) -> Self {
        Self {
            path: path.into(),
            sha256: format!("{:x}", Sha256::digest(text.as_bytes())),
            farmers: dataset.farmers.len(),
            supply_points: dataset.supply_points.len(),
            sprinklers: dataset.sprinklers.len(),
            parcels: dataset.parcels.len(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "path": self.path,
            "sha256": self.sha256,
            "schema_version": SCHEMA_VERSION,
            "counts": {
                "farmers": self.farmers,
                "faucets": self.supply_points,
                "sprinklers": self.sprinklers,
                "parcels": self.parcels,
            }
        })
    }
}

/// Everything a billing sidecar records besides the artifact itself.
pub struct Payload {
    pub params: Value,
    pub inputs: Vec<InputDoc>,
    pub rows: usize,
}

/// Write `<artifact>.provenance.json`.
pub fn write_sidecar(artifact: &Path, payload: &Payload) -> Result<PathBuf> {
    let path = sidecar_path(artifact);
    let doc = json!({
        "code_rev": current_git_rev(),
        "version": aquashare::VERSION,
        "params": payload.params,
        "inputs": payload.inputs.iter().map(InputDoc::to_json).collect::<Vec<_>>(),
        "outputs": [{
            "path": artifact.to_string_lossy(),
            "rows": payload.rows,
        }]
    });
    fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn sidecar_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "bills".into());
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

/// `GIT_COMMIT` (build or run time), else `git rev-parse HEAD`, else "unknown".
pub fn current_git_rev() -> String {
    let pinned = option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|s| !s.is_empty());
    if let Some(rev) = pinned {
        return rev;
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquashare::model::{Farmer, FarmerId};
    use tempfile::tempdir;

    #[test]
    fn sidecar_sits_next_to_the_table() {
        assert_eq!(
            sidecar_path(Path::new("/tmp/output/bills.parquet")),
            Path::new("/tmp/output/bills.provenance.json")
        );
    }

    #[test]
    fn input_digest_tracks_document_bytes() {
        let ds = Dataset::default();
        let a = InputDoc::new("farm.json", "{}", &ds);
        // SHA-256 of "{}".
        assert_eq!(
            a.sha256,
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
        assert_ne!(InputDoc::new("farm.json", "{ }", &ds).sha256, a.sha256);
    }

    #[test]
    fn sidecar_records_document_and_rows() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("bills.csv");
        fs::write(&artifact, "farmer_id\n").unwrap();
        let ds = Dataset {
            farmers: vec![Farmer {
                id: FarmerId::from("far-1"),
                name: "Higa".into(),
                notes: None,
            }],
            ..Dataset::default()
        };
        let payload = Payload {
            params: json!({"radius_m": 30.0}),
            inputs: vec![InputDoc::new("farm.json", "{}", &ds)],
            rows: 1,
        };
        let path = write_sidecar(&artifact, &payload).unwrap();
        let parsed: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(parsed["outputs"][0]["path"], artifact.to_string_lossy().as_ref());
        assert_eq!(parsed["outputs"][0]["rows"], 1);
        let input = &parsed["inputs"][0];
        assert_eq!(input["path"], "farm.json");
        assert_eq!(input["schema_version"], 1);
        assert_eq!(input["counts"]["farmers"], 1);
        assert_eq!(input["sha256"].as_str().map(str::len), Some(64));
        assert_eq!(parsed["params"]["radius_m"], 30.0);
    }
}
