//! Billing table export via polars.

use anyhow::{Context, Result};
use aquashare::alloc::FarmerBilling;
use aquashare::model::{Dataset, FarmerId};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// One row per billed farmer, in farmer id order.
pub fn billing_frame(
    dataset: &Dataset,
    bills: &BTreeMap<FarmerId, FarmerBilling>,
) -> PolarsResult<DataFrame> {
    let rows: Vec<&FarmerBilling> = bills.values().collect();
    let name_of = |id: &FarmerId| {
        dataset
            .farmer(id)
            .map(|f| f.name.clone())
            .unwrap_or_default()
    };
    df!(
        "farmer_id" => rows.iter().map(|b| b.farmer.to_string()).collect::<Vec<_>>(),
        "farmer_name" => rows.iter().map(|b| name_of(&b.farmer)).collect::<Vec<_>>(),
        "assessed_area_sqm" => rows.iter().map(|b| b.assessed_area_sqm).collect::<Vec<_>>(),
        "base_fee" => rows.iter().map(|b| b.base_fee).collect::<Vec<_>>(),
        "base_volume_m3" => rows.iter().map(|b| b.base_volume_m3).collect::<Vec<_>>(),
        "overage_volume_m3" => rows.iter().map(|b| b.overage_volume_m3).collect::<Vec<_>>(),
        "overage_fee" => rows.iter().map(|b| b.overage_fee).collect::<Vec<_>>(),
        "total" => rows.iter().map(|b| b.total).collect::<Vec<_>>()
    )
}

/// Write as Parquet for a `.parquet` extension, CSV otherwise.
pub fn write_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("parquet") => {
            ParquetWriter::new(file).finish(df)?;
        }
        _ => {
            CsvWriter::new(file).include_header(true).finish(df)?;
        }
    }
    Ok(())
}
