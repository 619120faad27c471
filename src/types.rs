//! Shared types and enums used across demvref.
//! Includes the canonical vertical reference names (`VRefName`), the
//! well-known geoid grid file names, and `CrsSourceKind`.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// EGM2008 geoid at 2.5 arc-minute resolution (PROJ-data)
pub const EGM08_GRID: &str = "us_nga_egm08_25.tif";
/// EGM1996 geoid at 15 arc-minute resolution (PROJ-data)
pub const EGM96_GRID: &str = "us_nga_egm96_15.tif";

/// Canonical vertical reference names
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Debug, Serialize, Deserialize)]
pub enum VRefName {
    /// WGS84 ellipsoid heights
    #[value(name = "WGS84")]
    #[serde(rename = "WGS84")]
    Wgs84,
    /// Heights above the EGM96 geoid
    #[value(name = "EGM96")]
    #[serde(rename = "EGM96")]
    Egm96,
    /// Heights above the EGM2008 geoid
    #[value(name = "EGM08")]
    #[serde(rename = "EGM08")]
    Egm08,
}

impl VRefName {
    pub const ALL: [VRefName; 3] = [VRefName::Wgs84, VRefName::Egm96, VRefName::Egm08];

    pub fn as_str(&self) -> &'static str {
        match self {
            VRefName::Wgs84 => "WGS84",
            VRefName::Egm96 => "EGM96",
            VRefName::Egm08 => "EGM08",
        }
    }

    /// Geoid grid implied by the name; the ellipsoid has none.
    pub fn grid(&self) -> Option<&'static str> {
        match self {
            VRefName::Wgs84 => None,
            VRefName::Egm96 => Some(EGM96_GRID),
            VRefName::Egm08 => Some(EGM08_GRID),
        }
    }

    /// Exact-match lookup of a canonical name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == name)
    }

    /// Canonical name owning one of the well-known grids
    pub fn from_grid(grid: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.grid() == Some(grid))
    }
}

impl std::fmt::Display for VRefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the horizontal CRS of a DEM is obtained
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrsSourceKind {
    /// Pick from the linked PROJ version
    #[default]
    Auto,
    /// Use the CRS read along with the raster
    Native,
    /// Extract the CRS with `gdalinfo -json` (old PROJ releases)
    GdalInfo,
}
