use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{CrsSourceKind, VRefName};

/// Options used when building a DEM, suitable for config files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemOptions {
    /// Vertical reference name supplied by the user (wins over product inference)
    pub vref_name: Option<String>,
    /// Geoid grid supplied by the user
    pub vref_grid: Option<String>,
    /// Suppress informative vertical reference messages
    pub silent: bool,
    pub crs_source: CrsSourceKind,
    /// Program run when the CRS is extracted with gdalinfo
    pub gdalinfo_program: String,
    /// Overrides the PROJ data directory for grid lookups
    pub grid_data_dir: Option<PathBuf>,
    /// Overrides the nodata value stored in the file
    pub nodata: Option<f64>,
}

impl Default for DemOptions {
    fn default() -> Self {
        Self {
            vref_name: None,
            vref_grid: None,
            silent: true,
            crs_source: CrsSourceKind::Auto,
            gdalinfo_program: "gdalinfo".to_string(),
            grid_data_dir: None,
            nodata: None,
        }
    }
}

impl DemOptions {
    pub fn with_vref_name(mut self, name: impl Into<String>) -> Self {
        self.vref_name = Some(name.into());
        self
    }

    pub fn with_vref_grid(mut self, grid: impl Into<String>) -> Self {
        self.vref_grid = Some(grid.into());
        self
    }

    pub fn with_grid_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.grid_data_dir = Some(dir.into());
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }
}

/// Parameters of a vertical reference conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertParams {
    /// Destination vertical reference name
    pub vref_name: Option<String>,
    /// Destination geoid grid (wins over the name)
    pub vref_grid: Option<String>,
    /// How the source DEM is opened
    pub source: DemOptions,
}

impl Default for ConvertParams {
    fn default() -> Self {
        Self {
            vref_name: Some(VRefName::Egm96.to_string()),
            vref_grid: None,
            source: DemOptions::default(),
        }
    }
}

impl ConvertParams {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
