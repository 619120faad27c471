//! Vertical reference resolution: product name lookup, the `(vref, vref_grid)`
//! state carried by a DEM, and validation of user supplied names and grids.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::proj::find_grid;
use crate::types::VRefName;

/// Invalid or missing vertical reference
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VrefError {
    #[error(
        "Vertical reference name must be either \"WGS84\", \"EGM96\" or \"EGM08\", got \"{0}\". \
         Otherwise, provide a geoid grid from PROJ-data: https://github.com/OSGeo/PROJ-data"
    )]
    UnknownName(String),

    #[error(
        "Grid {grid} not found in {dir}: check that proj-data is installed, the PROJ data \
         directory, and that you are using a grid available at https://github.com/OSGeo/PROJ-data"
    )]
    GridNotFound { grid: String, dir: String },

    #[error("Vertical reference name or vertical grid must be a non-empty string")]
    Missing,

    #[error(
        "The current DEM has no vertical reference: set one before attempting a conversion \
         towards another vertical reference"
    )]
    NoSourceReference,

    #[error("Vertical reference \"{0}\" has no geoid grid: cannot build a compound CRS")]
    NoCompoundCrs(String),
}

/// Vertical reference implied by a DEM product name.
///
/// Sources: product user guides of AW3D30, SRTMGL1, SRTMv4.1, ASTGTM2, NASADEM
/// (HGTS is ellipsoidal, HGT is EGM96), ArcticDEM/REMA, TanDEM-X 90m and Copernicus DEM.
pub fn parse_vref_from_product(product: Option<&str>) -> Option<VRefName> {
    match product? {
        "ArcticDEM/REMA" | "TDM1" | "NASADEM-HGTS" => Some(VRefName::Wgs84),
        "AW3D30" | "SRTMv4.1" | "SRTMGL1" | "ASTGTM2" | "NASADEM-HGT" => Some(VRefName::Egm96),
        "COPDEM" => Some(VRefName::Egm08),
        _ => None,
    }
}

/// Vertical reference attached to a DEM
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VRefState {
    /// Canonical name, or a free-form description for unrecognized grids
    pub vref: Option<String>,
    /// Geoid grid file name, relative to the grid data directory
    pub vref_grid: Option<String>,
}

impl VRefState {
    pub fn new(vref: Option<String>, vref_grid: Option<String>) -> Self {
        Self { vref, vref_grid }
    }

    pub fn is_unset(&self) -> bool {
        self.vref.is_none() && self.vref_grid.is_none()
    }

    /// The ellipsoid needs no vertical component in a compound CRS
    pub fn is_ellipsoid(&self) -> bool {
        self.vref.as_deref() == Some(VRefName::Wgs84.as_str())
    }

    pub fn from_name(name: VRefName) -> Self {
        Self {
            vref: Some(name.as_str().to_string()),
            vref_grid: name.grid().map(str::to_string),
        }
    }

    /// Resolve a name and/or grid into a state.
    ///
    /// A non-empty grid wins over the name. Grids other than the two well-known
    /// EGM files must exist in one of `grid_dirs`.
    pub fn from_setting(
        vref_name: Option<&str>,
        vref_grid: Option<&str>,
        grid_dirs: &[PathBuf],
    ) -> Result<Self, VrefError> {
        let vref_name = vref_name.filter(|s| !s.is_empty());
        let vref_grid = vref_grid.filter(|s| !s.is_empty());

        if let Some(grid) = vref_grid {
            if let Some(name) = VRefName::from_grid(grid) {
                return Ok(Self::from_name(name));
            }
            return match find_grid(grid, grid_dirs) {
                Some(_) => Ok(Self {
                    vref: Some(format!("Unknown vertical reference name from: {}", grid)),
                    vref_grid: Some(grid.to_string()),
                }),
                None if grid_dirs.is_empty() => Err(VrefError::GridNotFound {
                    grid: grid.to_string(),
                    dir: "<unknown PROJ data directory>".to_string(),
                }),
                None => Err(VrefError::GridNotFound {
                    grid: grid.to_string(),
                    dir: grid_dirs
                        .iter()
                        .map(|d| d.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                }),
            };
        }

        match vref_name {
            Some(name) => VRefName::from_name(name)
                .map(Self::from_name)
                .ok_or_else(|| VrefError::UnknownName(name.to_string())),
            None => Err(VrefError::Missing),
        }
    }
}
