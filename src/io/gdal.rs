use gdal::{Dataset, Metadata, errors::GdalError as GdalCrateError};
use ndarray::{Array2, Array3};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tracing::debug;

use crate::core::crs::Crs;
use crate::core::raster::Raster;

static MEM_FILE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Errors encountered when reading rasters through GDAL
#[derive(Debug, Error)]
pub enum GdalError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalCrateError),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Dimension mismatch: expected {0}x{1}, got {2} values")]
    DimensionMismatch(usize, usize, usize),
}

/// Metadata extracted from a GDAL-supported dataset
#[derive(Debug, Clone)]
pub struct GdalMetadata {
    /// Width (pixels) of the raster
    pub size_x: usize,
    /// Height (lines) of the raster
    pub size_y: usize,
    /// Number of raster bands
    pub bands: usize,
    /// Affine geotransform coefficients ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height])
    pub geotransform: [f64; 6],
    /// Projection in WKT format, empty when the dataset has none
    pub projection: String,
    /// Nodata value of the first band
    pub nodata: Option<f64>,
    /// Additional metadata key-value pairs
    pub metadata: HashMap<String, String>,
}

impl GdalMetadata {
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, GdalError> {
        let (size_x, size_y) = dataset.raster_size();
        let bands = dataset.raster_count() as usize;
        if bands == 0 {
            return Err(GdalError::UnsupportedFormat("No raster bands found".into()));
        }
        let geotransform = match dataset.geo_transform() {
            Ok(gt) => gt,
            Err(_) => [0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        };
        let mut projection = dataset.projection();
        if projection.is_empty() {
            // Fallback to GCP projection if available
            if let Some(gcp_proj) = dataset.gcp_projection() {
                if !gcp_proj.is_empty() {
                    projection = gcp_proj;
                }
            }
        }
        let nodata = dataset.rasterband(1)?.no_data_value();
        // Collect metadata entries (domain "")
        let mut metadata = HashMap::new();
        if let Some(entries) = dataset.metadata_domain("") {
            for entry in entries {
                if let Some((key, val)) = entry.split_once('=') {
                    metadata.insert(key.to_string(), val.to_string());
                }
            }
        }
        Ok(GdalMetadata {
            size_x: size_x as usize,
            size_y: size_y as usize,
            bands,
            geotransform,
            projection,
            nodata,
            metadata,
        })
    }
}

/// Read a single band (1-based index) as an f64 ndarray of shape (height, width)
pub fn read_band(
    dataset: &Dataset,
    metadata: &GdalMetadata,
    index: usize,
) -> Result<Array2<f64>, GdalError> {
    if index == 0 || index > metadata.bands {
        return Err(GdalError::UnsupportedFormat(format!(
            "Band index {} out of range",
            index
        )));
    }
    let band = dataset.rasterband(index)?;
    let window = (metadata.size_x, metadata.size_y);
    let buf = band.read_as::<f64>((0, 0), window, window, None)?;
    let data_vec = buf.data().to_vec();
    let len = data_vec.len();
    Array2::from_shape_vec((metadata.size_y, metadata.size_x), data_vec)
        .map_err(|_| GdalError::DimensionMismatch(metadata.size_x, metadata.size_y, len))
}

/// Read every band of an open dataset into a [`Raster`]
pub fn read_raster(dataset: &Dataset) -> Result<Raster, GdalError> {
    let metadata = GdalMetadata::from_dataset(dataset)?;
    let mut data = Array3::<f64>::zeros((metadata.bands, metadata.size_y, metadata.size_x));
    for idx in 1..=metadata.bands {
        let band = read_band(dataset, &metadata, idx)?;
        data.index_axis_mut(ndarray::Axis(0), idx - 1).assign(&band);
    }
    let crs = if metadata.projection.is_empty() {
        None
    } else {
        Some(Crs::Wkt(metadata.projection.clone()))
    };
    let path = dataset
        .description()
        .ok()
        .map(PathBuf::from)
        .filter(|p| p.is_file());
    debug!(
        "Read raster {:?}: {}x{} pixels, {} band(s)",
        path, metadata.size_x, metadata.size_y, metadata.bands
    );
    Ok(Raster {
        data,
        geotransform: metadata.geotransform,
        crs,
        nodata: metadata.nodata,
        path,
        metadata: metadata.metadata,
    })
}

/// Open a GDAL-supported file (e.g., GeoTIFF, HGT, VRT) into a [`Raster`]
pub fn open_raster<P: AsRef<Path>>(path: P) -> Result<Raster, GdalError> {
    let dataset = Dataset::open(path.as_ref())?;
    let mut raster = read_raster(&dataset)?;
    raster.path = Some(path.as_ref().to_path_buf());
    Ok(raster)
}

/// Read a raster from an in-memory file image, mounted under `/vsimem/`
pub fn raster_from_bytes(bytes: Vec<u8>) -> Result<Raster, GdalError> {
    let name = format!(
        "/vsimem/demvref_{}_{}",
        std::process::id(),
        MEM_FILE_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    gdal::vsi::create_mem_file(&name, bytes)?;
    let result = Dataset::open(&name)
        .map_err(GdalError::from)
        .and_then(|dataset| read_raster(&dataset));
    gdal::vsi::unlink_mem_file(&name)?;
    let mut raster = result?;
    raster.path = None;
    Ok(raster)
}
