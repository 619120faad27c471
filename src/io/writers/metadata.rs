use gdal::Dataset;
use gdal::Metadata;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::dem::Dem;
use crate::error::Result;

/// Metadata item holding the vertical reference name
pub const VREF_KEY: &str = "VREF";
/// Metadata item holding the geoid grid file name
pub const VREF_GRID_KEY: &str = "VREF_GRID";
/// Metadata item naming the program that wrote the file
pub const CONVERSION_TOOL_KEY: &str = "CONVERSION_TOOL";
pub const TOOL_NAME: &str = "demvref";

/// Collect the metadata items written along with a DEM
pub fn extract_metadata_fields(dem: &Dem) -> HashMap<String, String> {
    let mut metadata = HashMap::new();

    if let Some(vref) = dem.vref() {
        metadata.insert(VREF_KEY.to_string(), vref.to_string());
    }
    if let Some(grid) = dem.vref_grid() {
        metadata.insert(VREF_GRID_KEY.to_string(), grid.to_string());
    }

    let satimg = dem.satimg();
    if let Some(product) = &satimg.product {
        metadata.insert("PRODUCT".to_string(), product.clone());
    }
    if let Some(sensor) = &satimg.sensor {
        metadata.insert("SENSOR".to_string(), sensor.clone());
    }
    if let Some(tile) = &satimg.tile_name {
        metadata.insert("TILE_NAME".to_string(), tile.clone());
    }
    if let Some(datetime) = satimg.datetime {
        metadata.insert(
            "ACQUISITION_DATETIME".to_string(),
            datetime.format("%Y-%m-%dT%H:%M:%S").to_string(),
        );
    }

    // Conversion provenance
    metadata.insert(CONVERSION_TOOL_KEY.to_string(), TOOL_NAME.to_string());
    metadata.insert(
        "CONVERSION_VERSION".to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    metadata.insert(
        "CONVERSION_TIMESTAMP".to_string(),
        chrono::Utc::now().to_rfc3339(),
    );

    metadata
}

/// Embed the DEM metadata items into a dataset (domain "")
pub fn embed_tiff_metadata(ds: &mut Dataset, dem: &Dem) -> Result<()> {
    let mut fields: Vec<(String, String)> = extract_metadata_fields(dem).into_iter().collect();
    fields.sort();
    for (key, value) in fields {
        ds.set_metadata_item(&key, &value, "")?;
    }
    Ok(())
}

/// Write `value` as pretty JSON next to `output_path` (same stem, `.json`)
pub fn write_json_sidecar<T: Serialize>(output_path: &Path, value: &T) -> Result<PathBuf> {
    let sidecar_path = output_path.with_extension("json");
    let json_string = serde_json::to_string_pretty(value)?;
    std::fs::write(&sidecar_path, json_string)?;
    info!("Created metadata sidecar: {:?}", sidecar_path);
    Ok(sidecar_path)
}
