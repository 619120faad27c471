//! Minimal georeferenced raster: band stack, affine geotransform, CRS and nodata.
use std::collections::HashMap;
use std::path::PathBuf;

use ndarray::{Array2, Array3, Zip};

use crate::core::crs::Crs;
use crate::error::{Error, Result};

/// Raster data with georeferencing
#[derive(Debug, Clone)]
pub struct Raster {
    /// Pixel values with shape (bands, rows, cols)
    pub data: Array3<f64>,
    /// Affine geotransform coefficients ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height])
    pub geotransform: [f64; 6],
    /// Horizontal CRS read with the data, if any
    pub crs: Option<Crs>,
    pub nodata: Option<f64>,
    /// File the raster was read from; absent for in-memory rasters
    pub path: Option<PathBuf>,
    /// Dataset metadata items (domain "")
    pub metadata: HashMap<String, String>,
}

impl Raster {
    pub fn new(data: Array3<f64>, geotransform: [f64; 6], crs: Option<Crs>) -> Self {
        Self {
            data,
            geotransform,
            crs,
            nodata: None,
            path: None,
            metadata: HashMap::new(),
        }
    }

    pub fn band_count(&self) -> usize {
        self.data.dim().0
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        let (_, rows, cols) = self.data.dim();
        (rows, cols)
    }

    /// File name without directories, used for product inference
    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }

    /// Map coordinates of every pixel center as (xx, yy), each shaped (rows, cols)
    pub fn coords_center(&self) -> (Array2<f64>, Array2<f64>) {
        let (rows, cols) = self.shape();
        let gt = self.geotransform;
        let mut xx = Array2::<f64>::zeros((rows, cols));
        let mut yy = Array2::<f64>::zeros((rows, cols));
        Zip::indexed(&mut xx)
            .and(&mut yy)
            .par_for_each(|(row, col), x, y| {
                let (c, r) = (col as f64 + 0.5, row as f64 + 0.5);
                *x = gt[0] + c * gt[1] + r * gt[2];
                *y = gt[3] + c * gt[4] + r * gt[5];
            });
        (xx, yy)
    }

    /// True when the value carries no elevation
    pub fn is_nodata(&self, value: f64) -> bool {
        value.is_nan() || self.nodata.is_some_and(|nd| value == nd)
    }

    /// Copy with the same georeferencing, optionally swapping in new pixel values
    pub fn copy(&self, new_array: Option<Array3<f64>>) -> Result<Raster> {
        let data = match new_array {
            Some(array) if array.dim() != self.data.dim() => {
                return Err(Error::InvalidInput(format!(
                    "new array shape {:?} does not match raster shape {:?}",
                    array.dim(),
                    self.data.dim()
                )));
            }
            Some(array) => array,
            None => self.data.clone(),
        };
        Ok(Raster {
            data,
            geotransform: self.geotransform,
            crs: self.crs.clone(),
            nodata: self.nodata,
            path: self.path.clone(),
            metadata: self.metadata.clone(),
        })
    }
}
