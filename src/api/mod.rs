//! High-level, ergonomic library API: open and describe DEMs, convert a DEM
//! to another vertical reference into a GeoTIFF, and batch helpers for
//! directories. Prefer these entrypoints over the `core` modules when
//! integrating demvref.
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::dem::Dem;
use crate::core::params::{ConvertParams, DemOptions};
use crate::error::{Error, Result};
use crate::io::writers::tiff::write_dem;

/// Summary of a DEM and its vertical reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemInfo {
    pub path: Option<PathBuf>,
    pub width: usize,
    pub height: usize,
    pub product: Option<String>,
    pub sensor: Option<String>,
    pub tile_name: Option<String>,
    pub datetime: Option<NaiveDateTime>,
    pub vref: Option<String>,
    pub vref_grid: Option<String>,
    /// EPSG code of the horizontal CRS
    pub epsg: Option<u32>,
    /// Definition of the compound CRS, when one can be built
    pub compound_crs: Option<String>,
}

/// Open a DEM file
pub fn open_dem(path: &Path, options: &DemOptions) -> Result<Dem> {
    Dem::open(path, options)
}

/// Describe a DEM. CRS failures are logged and leave the matching fields empty.
pub fn describe_dem(dem: &mut Dem) -> DemInfo {
    let epsg = match dem.horizontal_crs().and_then(|crs| crs.epsg()) {
        Ok(code) => Some(code),
        Err(e) => {
            debug!("No EPSG code for the horizontal CRS: {}", e);
            None
        }
    };
    let compound_crs = match dem.compound_crs() {
        Ok(ccrs) => ccrs.map(|c| c.definition().to_string()),
        Err(e) => {
            debug!("No compound CRS: {}", e);
            None
        }
    };

    let (height, width) = dem.shape();
    let satimg = dem.satimg();
    DemInfo {
        path: dem.raster().path.clone(),
        width,
        height,
        product: satimg.product.clone(),
        sensor: satimg.sensor.clone(),
        tile_name: satimg.tile_name.clone(),
        datetime: satimg.datetime,
        vref: dem.vref().map(str::to_string),
        vref_grid: dem.vref_grid().map(str::to_string),
        epsg,
        compound_crs,
    }
}

/// Convert `input` to the destination vertical reference of `params` and
/// write it as a GeoTIFF at `output`. Returns the description of the result.
pub fn convert_dem_to_path(input: &Path, output: &Path, params: &ConvertParams) -> Result<DemInfo> {
    let mut dem = open_dem(input, &params.source)?;
    info!(
        "Converting {:?} from {:?} to {:?}",
        input,
        dem.vref(),
        params.vref_grid.as_deref().or(params.vref_name.as_deref())
    );
    dem.to_vref(params.vref_name.as_deref(), params.vref_grid.as_deref())?;
    write_dem(output, &dem)?;
    Ok(describe_dem(&mut dem))
}

/// Batch conversion report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// GeoTIFF files are the only inputs picked up in batch mode
pub fn is_dem_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"))
}

/// Return the entries of `input_dir`, sorted by name
fn sorted_entries(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(input_dir).map_err(Error::from)? {
        paths.push(entry.map_err(Error::from)?.path());
    }
    paths.sort();
    Ok(paths)
}

/// Convert every GeoTIFF of `input_dir` into `output_dir` (same file names) using `params`.
/// Other entries are skipped. If `continue_on_error` is true, failures are counted in
/// the report and processing continues; otherwise, the first error is returned.
pub fn convert_directory_to_path(
    input_dir: &Path,
    output_dir: &Path,
    params: &ConvertParams,
    continue_on_error: bool,
) -> Result<BatchReport> {
    std::fs::create_dir_all(output_dir).map_err(Error::from)?;

    let mut report = BatchReport::default();
    for path in sorted_entries(input_dir)? {
        let Some(name) = path.file_name().filter(|_| is_dem_file(&path)) else {
            debug!("Skipping non-DEM entry: {:?}", path);
            report.skipped += 1;
            continue;
        };
        let output_path = output_dir.join(name);

        match convert_dem_to_path(&path, &output_path, params) {
            Ok(_) => report.processed += 1,
            Err(e) => {
                report.errors += 1;
                if !continue_on_error {
                    return Err(e);
                }
                warn!("Error converting {:?}: {}", path, e);
            }
        }
    }

    info!(
        "Batch conversion complete: processed={} skipped={} errors={}",
        report.processed, report.skipped, report.errors
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_dem_file() {
        let dir = TempDir::new().unwrap();
        for name in ["a.tif", "b.TIFF", "c.hgt", "d.json"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        assert!(is_dem_file(&dir.path().join("a.tif")));
        assert!(is_dem_file(&dir.path().join("b.TIFF")));
        assert!(!is_dem_file(&dir.path().join("c.hgt")));
        assert!(!is_dem_file(&dir.path().join("d.json")));
        assert!(!is_dem_file(&dir.path().join("missing.tif")));
        assert!(!is_dem_file(dir.path()));
    }

    #[test]
    fn test_batch_stops_on_first_error() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        std::fs::write(input.path().join("broken.tif"), b"not a tiff").unwrap();
        std::fs::write(input.path().join("notes.txt"), b"").unwrap();

        let params = ConvertParams::default();
        assert!(convert_directory_to_path(input.path(), output.path(), &params, false).is_err());

        let report = convert_directory_to_path(input.path(), output.path(), &params, true).unwrap();
        assert_eq!(
            report,
            BatchReport {
                processed: 0,
                skipped: 1,
                errors: 1
            }
        );
    }
}
