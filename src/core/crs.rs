//! CRS values, EPSG resolution and compound (horizontal + geoid) CRS construction.
//!
//! The horizontal CRS of a DEM is obtained through a [`CrsSource`], chosen once
//! from the linked PROJ release: recent releases read it with the raster, older
//! ones need `gdalinfo -json` to expose every CRS flavour.
use std::path::{Path, PathBuf};
use std::process::Command;

use gdal::spatial_ref::{AxisMappingStrategy, SpatialRef};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::proj::{ProjVersion, find_grid};
use crate::core::raster::Raster;
use crate::core::vref::VRefState;
use crate::error::{Error, Result};
use crate::types::{CrsSourceKind, VRefName};

/// A coordinate reference system definition understood by GDAL/PROJ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crs {
    Wkt(String),
    Proj(String),
}

impl Crs {
    pub fn from_epsg(code: u32) -> Result<Self> {
        Ok(Crs::Wkt(SpatialRef::from_epsg(code)?.to_wkt()?))
    }

    pub fn definition(&self) -> &str {
        match self {
            Crs::Wkt(s) | Crs::Proj(s) => s,
        }
    }

    /// GDAL spatial reference with (x=easting/longitude, y=northing/latitude) axes
    pub fn to_spatial_ref(&self) -> Result<SpatialRef> {
        let mut srs = match self {
            Crs::Wkt(wkt) => SpatialRef::from_wkt(wkt)?,
            Crs::Proj(proj) => SpatialRef::from_proj4(proj)?,
        };
        srs.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
        Ok(srs)
    }

    pub fn to_wkt(&self) -> Result<String> {
        match self {
            Crs::Wkt(wkt) => Ok(wkt.clone()),
            Crs::Proj(_) => Ok(self.to_spatial_ref()?.to_wkt()?),
        }
    }

    /// EPSG code of the CRS, identified from the database when not explicit
    pub fn epsg(&self) -> Result<u32> {
        let unresolvable = || Error::UnresolvableCrs(abbreviate(self.definition()));
        let mut srs = self.to_spatial_ref().map_err(|_| unresolvable())?;
        if let Some(code) = srs.auth_code().ok().and_then(positive) {
            return Ok(code);
        }
        if srs.auto_identify_epsg().is_ok() {
            if let Some(code) = srs.auth_code().ok().and_then(positive) {
                return Ok(code);
            }
        }
        match self {
            Crs::Wkt(wkt) => parse_epsg_authority(wkt).ok_or_else(unresolvable),
            Crs::Proj(_) => Err(unresolvable()),
        }
    }
}

fn positive(code: i32) -> Option<u32> {
    u32::try_from(code).ok().filter(|c| *c > 0)
}

fn abbreviate(definition: &str) -> String {
    const MAX: usize = 80;
    match definition.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &definition[..idx]),
        None => definition.to_string(),
    }
}

/// Root EPSG identifier from a WKT1 `AUTHORITY` or WKT2 `ID` tag
pub fn parse_epsg_authority(wkt: &str) -> Option<u32> {
    const KEYS: [&str; 2] = ["AUTHORITY[\"EPSG\",\"", "ID[\"EPSG\","];
    let (idx, key) = KEYS
        .iter()
        .filter_map(|key| wkt.rfind(key).map(|idx| (idx, *key)))
        .max_by_key(|(idx, _)| *idx)?;
    let start = idx + key.len();
    let end = wkt[start..].find(|c: char| !c.is_ascii_digit())?;
    wkt[start..start + end].parse().ok()
}

/// Grid reference placed in `+geoidgrids`: well-known grids stay bare so PROJ
/// resolves them itself, others point into the grid data directory.
fn grid_reference(grid: &str, grid_dirs: &[PathBuf]) -> String {
    if VRefName::from_grid(grid).is_some() {
        return grid.to_string();
    }
    match find_grid(grid, grid_dirs) {
        Some(path) => path.display().to_string(),
        None => grid.to_string(),
    }
}

/// Compound CRS of a horizontal CRS and a vertical reference.
///
/// The ellipsoid keeps the horizontal CRS; a geoid grid is attached to the
/// EPSG definition of the horizontal CRS; a name alone yields no CRS.
pub fn compound_crs(
    horizontal: &Crs,
    state: &VRefState,
    grid_dirs: &[PathBuf],
) -> Result<Option<Crs>> {
    if state.is_ellipsoid() {
        return Ok(Some(horizontal.clone()));
    }
    let Some(grid) = state.vref_grid.as_deref() else {
        return Ok(None);
    };
    let epsg = horizontal.epsg()?;
    let base = SpatialRef::from_epsg(epsg)?.to_proj4()?;
    let base = base.replace("+no_defs", "");
    Ok(Some(Crs::Proj(format!(
        "{} +geoidgrids={} +vunits=m +no_defs",
        base.trim(),
        grid_reference(grid, grid_dirs)
    ))))
}

/// Strategy used to obtain the horizontal CRS of a raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrsSource {
    /// CRS read along with the raster
    Native,
    /// CRS extracted by running `<program> -json <file>`
    GdalInfo { program: String },
}

impl CrsSource {
    pub fn detect(kind: CrsSourceKind, program: &str) -> Self {
        match kind {
            CrsSourceKind::Native => CrsSource::Native,
            CrsSourceKind::GdalInfo => CrsSource::GdalInfo {
                program: program.to_string(),
            },
            CrsSourceKind::Auto => {
                let version = ProjVersion::linked();
                debug!("Linked PROJ version: {}", version);
                if version.supports_native_crs() {
                    CrsSource::Native
                } else {
                    CrsSource::GdalInfo {
                        program: program.to_string(),
                    }
                }
            }
        }
    }

    pub fn horizontal_crs(&self, raster: &Raster) -> Result<Crs> {
        match (self, raster.path.as_deref()) {
            (CrsSource::GdalInfo { program }, Some(path)) => crs_from_gdalinfo(program, path),
            (CrsSource::GdalInfo { .. }, None) => {
                debug!("In-memory raster: reading its CRS directly");
                native_crs(raster)
            }
            (CrsSource::Native, _) => native_crs(raster),
        }
    }
}

fn native_crs(raster: &Raster) -> Result<Crs> {
    raster
        .crs
        .clone()
        .ok_or_else(|| Error::UnresolvableCrs("the raster has no horizontal CRS".to_string()))
}

#[derive(Deserialize)]
struct GdalInfoJson {
    #[serde(rename = "coordinateSystem")]
    coordinate_system: GdalInfoCoordinateSystem,
}

#[derive(Deserialize)]
struct GdalInfoCoordinateSystem {
    wkt: String,
}

/// Run `<program> -json <path>` and read `coordinateSystem.wkt` from its output
pub fn crs_from_gdalinfo(program: &str, path: &Path) -> Result<Crs> {
    debug!("Extracting CRS with {} -json {:?}", program, path);
    let output = Command::new(program)
        .arg("-json")
        .arg(path)
        .output()
        .map_err(|e| Error::ExternalTool(format!("{} exec error: {}", program, e)))?;
    if !output.status.success() {
        return Err(Error::ExternalTool(format!(
            "{} failed ({}): {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    parse_gdalinfo_json(&output.stdout)
}

pub(crate) fn parse_gdalinfo_json(stdout: &[u8]) -> Result<Crs> {
    let info: GdalInfoJson = serde_json::from_slice(stdout)
        .map_err(|e| Error::ExternalTool(format!("unparsable gdalinfo output: {}", e)))?;
    Ok(Crs::Wkt(info.coordinate_system.wkt))
}
