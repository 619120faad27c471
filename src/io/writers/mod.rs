//! Output writers: Float32 GeoTIFF DEMs, embedded vertical reference
//! metadata tags and JSON sidecars.
pub mod metadata;
pub mod tiff;
