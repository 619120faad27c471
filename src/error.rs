//! Crate-level error type and `Result` alias for structured error handling.
//! Wraps I/O, GDAL and JSON failures, and carries the semantic variants raised
//! while loading DEMs, resolving vertical references and building CRS objects.
use thiserror::Error;

use crate::core::vref::VrefError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] crate::io::GdalError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid raster input: {0}")]
    InvalidInput(String),

    #[error("DEM rasters should be composed of one band only, got {bands} bands")]
    MultiBand { bands: usize },

    #[error(transparent)]
    InvalidVerticalReference(#[from] VrefError),

    #[error("External tool error: {0}")]
    ExternalTool(String),

    #[error("Cannot resolve an EPSG code for the horizontal CRS: {0}")]
    UnresolvableCrs(String),
}

impl From<gdal::errors::GdalError> for Error {
    fn from(e: gdal::errors::GdalError) -> Self {
        Error::Gdal(crate::io::GdalError::Gdal(e))
    }
}

impl Error {
    /// True for errors caused by a bad value supplied by the caller
    /// (band count, vertical reference name or grid).
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            Error::MultiBand { .. } | Error::InvalidVerticalReference(_)
        )
    }
}
