//! I/O layer for DEM rasters.
//! Provides the GDAL-backed `gdal` reader, `satimg` file name parsing, and
//! `writers` for GeoTIFF outputs, vertical reference tags and sidecars.
pub mod gdal;
pub use gdal::{GdalError, GdalMetadata, open_raster, raster_from_bytes, read_raster};

pub mod satimg;
pub use satimg::{SatImgMetadata, parse_metadata_from_fn};

pub mod writers;
