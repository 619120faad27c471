//! Product, sensor, tile and acquisition date inferred from DEM file names.
//!
//! Covers the naming conventions of the common global and regional DEM
//! distributions (SRTM, NASADEM, ASTER, ALOS, TanDEM-X, Copernicus, ArcticDEM/REMA).
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Metadata parsed from a file name; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SatImgMetadata {
    pub sensor: Option<String>,
    pub product: Option<String>,
    pub tile_name: Option<String>,
    pub datetime: Option<NaiveDateTime>,
}

impl SatImgMetadata {
    fn new(sensor: Option<&str>, product: &str, tile_name: Option<String>) -> Self {
        Self {
            sensor: sensor.map(str::to_string),
            product: Some(product.to_string()),
            tile_name,
            datetime: None,
        }
    }

    fn at(mut self, datetime: Option<NaiveDateTime>) -> Self {
        self.datetime = datetime;
        self
    }
}

/// `N46E007`-style 1x1 degree tile name
fn is_latlon_tile(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 7
        && matches!(b[0].to_ascii_uppercase(), b'N' | b'S')
        && b[1..3].iter().all(u8::is_ascii_digit)
        && matches!(b[3].to_ascii_uppercase(), b'E' | b'W')
        && b[4..].iter().all(u8::is_ascii_digit)
}

fn date(s: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// ASTER L1A granule ids look like `003MMDDYYYYHHMMSS`
fn aster_datetime(granule: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(granule.get(3..)?, "%m%d%Y%H%M%S").ok()
}

/// Copernicus tiles split the corner over several fields (`N46_00_E007_00`)
fn copernicus_tile(parts: &[&str]) -> Option<String> {
    let lat = parts
        .iter()
        .find(|p| p.len() == 3 && (p.starts_with('N') || p.starts_with('S')))?;
    let lon = parts
        .iter()
        .find(|p| p.len() == 4 && (p.starts_with('E') || p.starts_with('W')))?;
    Some(format!("{}{}", lat, lon))
}

/// ArcticDEM/REMA mosaic tiles: `<row>_<col>[_<sub>_<sub>]_<res>m_v<ver>_dem`
fn is_pgc_mosaic(parts: &[&str]) -> bool {
    parts.len() >= 5
        && parts.last() == Some(&"dem")
        && parts[0].chars().all(|c| c.is_ascii_digit())
        && parts[1].chars().all(|c| c.is_ascii_digit())
        && parts.iter().any(|p| p.starts_with('v'))
        && parts
            .iter()
            .any(|p| p.len() > 1 && p.ends_with('m') && p[..p.len() - 1].chars().all(|c| c.is_ascii_digit()))
}

/// Infer DEM metadata from a file name (directories and extension are ignored)
pub fn parse_metadata_from_fn(file_name: &str) -> SatImgMetadata {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parts: Vec<&str> = stem.split('_').collect();
    let head = parts[0];

    match head {
        "SETSM" if parts.len() >= 3 => {
            SatImgMetadata::new(Some(parts[1]), "ArcticDEM/REMA", None).at(date(parts[2]))
        }
        "AST" if parts.get(1) == Some(&"L1A") => SatImgMetadata::new(Some("ASTER"), "L1A", None)
            .at(parts.get(2).and_then(|g| aster_datetime(g))),
        "ASTGTM2" => SatImgMetadata::new(
            Some("ASTER"),
            "ASTGTM2",
            parts.get(1).map(|t| t.to_string()),
        ),
        "NASADEM" if parts.len() >= 3 => SatImgMetadata::new(
            Some("SRTM"),
            &format!("NASADEM-{}", parts[1]),
            Some(parts[2].to_uppercase()),
        ),
        "TDM1" => SatImgMetadata::new(
            Some("TDX"),
            "TDM1",
            parts.iter().find(|p| is_latlon_tile(p)).map(|t| t.to_string()),
        ),
        "ALPSMLC30" => SatImgMetadata::new(
            Some("ALOS"),
            "AW3D30",
            parts.get(1).map(|t| t.to_string()),
        ),
        "Copernicus" => SatImgMetadata::new(Some("TDX"), "COPDEM", copernicus_tile(&parts)),
        h if h.eq_ignore_ascii_case("srtm")
            && parts.len() == 3
            && parts[1..].iter().all(|p| p.chars().all(|c| c.is_ascii_digit())) =>
        {
            SatImgMetadata::new(Some("SRTM"), "SRTMv4.1", Some(stem.to_lowercase()))
        }
        _ if is_pgc_mosaic(&parts) => {
            let tile_len = if parts.len() >= 7 { 4 } else { 2 };
            SatImgMetadata::new(None, "ArcticDEM/REMA", Some(parts[..tile_len].join("_")))
        }
        _ => {
            // `N46E007.hgt` or `N46E007.SRTMGL1.hgt`
            let tile = stem.split('.').next().unwrap_or_default();
            if parts.len() == 1 && is_latlon_tile(tile) {
                SatImgMetadata::new(Some("SRTM"), "SRTMGL1", Some(tile.to_uppercase()))
            } else {
                SatImgMetadata::default()
            }
        }
    }
}
