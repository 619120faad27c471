use gdal::DriverManager;
use gdal::raster::Buffer;
use std::path::Path;
use tracing::info;

use crate::core::dem::Dem;
use crate::error::Result;
use crate::io::writers::metadata::embed_tiff_metadata;

/// Write a DEM as a single-band Float32 GeoTIFF with its georeferencing,
/// nodata value and vertical reference metadata
pub fn write_dem(output: &Path, dem: &Dem) -> Result<()> {
    let (rows, cols) = dem.shape();
    let raster = dem.raster();

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let mut ds = driver.create_with_band_type::<f32, _>(output, cols, rows, 1)?;
    ds.set_geo_transform(&raster.geotransform)?;
    if let Some(crs) = &raster.crs {
        ds.set_projection(&crs.to_wkt()?)?;
    }

    {
        let mut band = ds.rasterband(1)?;
        if let Some(nodata) = raster.nodata {
            band.set_no_data_value(Some(nodata))?;
        }
        let values: Vec<f32> = dem.data().iter().map(|v| *v as f32).collect();
        let mut buf = Buffer::new((cols, rows), values);
        band.write((0, 0), (cols, rows), &mut buf)?;
    }

    embed_tiff_metadata(&mut ds, dem)?;
    info!("Written DEM GeoTIFF: {:?}", output);
    Ok(())
}
