//! Elevation transformation between two CRS, delegated to GDAL/PROJ.
use gdal::spatial_ref::CoordTransform;
use ndarray::{Array2, ArrayView2};
use tracing::debug;

use crate::core::crs::Crs;
use crate::error::{Error, Result};

/// Maps (x, y, z) point arrays to transformed (x', y', z') in place
pub trait ElevationTransformer {
    fn transform(&self, x: &mut [f64], y: &mut [f64], z: &mut [f64]) -> Result<()>;
}

/// PROJ coordinate operation between two CRS
pub struct GdalTransformer {
    inner: CoordTransform,
}

impl GdalTransformer {
    pub fn new(source: &Crs, dest: &Crs) -> Result<Self> {
        let src = source.to_spatial_ref()?;
        let dst = dest.to_spatial_ref()?;
        let inner = CoordTransform::new(&src, &dst).map_err(|e| {
            Error::ExternalTool(format!("cannot build coordinate transformation: {}", e))
        })?;
        Ok(Self { inner })
    }

    pub fn boxed(source: &Crs, dest: &Crs) -> Result<Box<dyn ElevationTransformer>> {
        Ok(Box::new(Self::new(source, dest)?))
    }
}

impl ElevationTransformer for GdalTransformer {
    fn transform(&self, x: &mut [f64], y: &mut [f64], z: &mut [f64]) -> Result<()> {
        self.inner
            .transform_coords(x, y, z)
            .map_err(|e| Error::ExternalTool(format!("coordinate transformation failed: {}", e)))
    }
}

/// New elevations for every valid pixel; nodata pixels keep their value.
///
/// `xx`/`yy` are pixel-center coordinates shaped like `zz`.
pub fn transform_elevations(
    xx: ArrayView2<f64>,
    yy: ArrayView2<f64>,
    zz: ArrayView2<f64>,
    is_nodata: impl Fn(f64) -> bool,
    transformer: &dyn ElevationTransformer,
) -> Result<Array2<f64>> {
    let valid: Vec<(usize, usize)> = zz
        .indexed_iter()
        .filter(|(_, z)| !is_nodata(**z))
        .map(|(idx, _)| idx)
        .collect();

    let mut x: Vec<f64> = valid.iter().map(|&idx| xx[idx]).collect();
    let mut y: Vec<f64> = valid.iter().map(|&idx| yy[idx]).collect();
    let mut z: Vec<f64> = valid.iter().map(|&idx| zz[idx]).collect();
    debug!("Transforming {} of {} pixels", valid.len(), zz.len());

    if !valid.is_empty() {
        transformer.transform(&mut x, &mut y, &mut z)?;
    }

    let mut out = zz.to_owned();
    for (&idx, value) in valid.iter().zip(z) {
        out[idx] = value;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    struct Shift(f64);

    impl ElevationTransformer for Shift {
        fn transform(&self, _x: &mut [f64], _y: &mut [f64], z: &mut [f64]) -> Result<()> {
            z.iter_mut().for_each(|zi| *zi += self.0);
            Ok(())
        }
    }

    #[test]
    fn test_skips_nodata() {
        let xx = array![[0.0, 1.0], [0.0, 1.0]];
        let yy = array![[1.0, 1.0], [0.0, 0.0]];
        let zz = array![[10.0, -9999.0], [f64::NAN, 20.0]];
        let out = transform_elevations(
            xx.view(),
            yy.view(),
            zz.view(),
            |v| v.is_nan() || v == -9999.0,
            &Shift(-5.0),
        )
        .unwrap();
        assert_eq!(out[[0, 0]], 5.0);
        assert_eq!(out[[0, 1]], -9999.0);
        assert!(out[[1, 0]].is_nan());
        assert_eq!(out[[1, 1]], 15.0);
    }

    #[test]
    fn test_identity_transformation() {
        let crs = Crs::from_epsg(4326).unwrap();
        let transformer = GdalTransformer::new(&crs, &crs).unwrap();
        let xx = array![[7.0, 7.1]];
        let yy = array![[46.0, 46.1]];
        let zz = array![[500.0, 510.0]];
        let out =
            transform_elevations(xx.view(), yy.view(), zz.view(), f64::is_nan, &transformer)
                .unwrap();
        assert!((out[[0, 0]] - 500.0).abs() < 1e-6);
        assert!((out[[0, 1]] - 510.0).abs() < 1e-6);
    }
}
