//! Core building blocks: the DEM entity, vertical reference resolution, CRS
//! construction, elevation transformation and configuration parameters.
//! Consumed by the high-level `api` module.
pub mod crs;
pub mod dem;
pub mod params;
pub mod proj;
pub mod raster;
pub mod transform;
pub mod vref;
