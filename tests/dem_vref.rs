//! Integration tests on GeoTIFF DEMs written through the GDAL `GTiff` driver.
//!
//! Tests are skipped when the driver is unavailable. Conversion tests use a
//! synthetic GTX geoid grid with a constant undulation, and are skipped when
//! the linked PROJ cannot build the transformation.

use std::path::{Path, PathBuf};

use demvref::{
    BatchReport, ConvertParams, CrsSourceKind, Dem, DemOptions, EGM96_GRID, Error, VrefError,
    convert_dem_to_path, convert_directory_to_path, describe_dem, write_dem,
};
use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager, Metadata};
use tempfile::TempDir;

const NODATA: f64 = -9999.0;
const VALUES: [f32; 6] = [100.0, 200.0, 300.0, -9999.0, 500.0, 600.0];
/// Constant geoid undulation of the synthetic grid
const UNDULATION: f32 = 10.0;

/// Write a 3x2 EPSG:4326 GeoTIFF over (7E, 46N), or `None` without the GTiff driver
fn write_tiff(path: &Path, bands: usize) -> Option<PathBuf> {
    let Ok(driver) = DriverManager::get_driver_by_name("GTiff") else {
        eprintln!("SKIPPING: GTiff driver not available");
        return None;
    };
    let mut ds = driver
        .create_with_band_type::<f32, _>(path, 3, 2, bands)
        .unwrap();
    ds.set_geo_transform(&[7.0, 0.5, 0.0, 46.0, 0.0, -0.5]).unwrap();
    ds.set_projection(&SpatialRef::from_epsg(4326).unwrap().to_wkt().unwrap())
        .unwrap();
    for b in 1..=bands {
        let mut band = ds.rasterband(b).unwrap();
        band.set_no_data_value(Some(NODATA)).unwrap();
        let mut buf = Buffer::new((3, 2), VALUES.to_vec());
        band.write((0, 0), (3, 2), &mut buf).unwrap();
    }
    Some(path.to_path_buf())
}

macro_rules! require_tiff {
    ($path:expr) => {
        require_tiff!($path, 1)
    };
    ($path:expr, $bands:expr) => {
        match write_tiff($path, $bands) {
            Some(path) => path,
            None => return,
        }
    };
}

/// GTX grid (big-endian header then values, south to north) covering 40-50N, 0-15E
fn write_gtx(path: &Path, undulation: f32) {
    let (rows, cols) = (11i32, 16i32);
    let mut bytes = Vec::new();
    for v in [40.0f64, 0.0, 1.0, 1.0] {
        bytes.extend_from_slice(&v.to_be_bytes());
    }
    bytes.extend_from_slice(&rows.to_be_bytes());
    bytes.extend_from_slice(&cols.to_be_bytes());
    for _ in 0..rows * cols {
        bytes.extend_from_slice(&undulation.to_be_bytes());
    }
    std::fs::write(path, bytes).unwrap();
}

fn options() -> DemOptions {
    DemOptions {
        crs_source: CrsSourceKind::Native,
        ..DemOptions::default()
    }
}

#[test]
fn open_from_path_infers_product() {
    let dir = TempDir::new().unwrap();
    let path = require_tiff!(&dir.path().join("N46E007.tif"));

    let dem = Dem::open(&path, &options()).unwrap();
    assert_eq!(dem.shape(), (2, 3));
    assert_eq!(dem.raster().nodata, Some(NODATA));
    assert_eq!(dem.product(), Some("SRTMGL1"));
    assert_eq!(dem.vref(), Some("EGM96"));
    assert_eq!(dem.vref_grid(), Some(EGM96_GRID));
    assert_eq!(dem.data()[[0, 0]], 100.0);
}

#[test]
fn open_from_bytes_and_dataset() {
    let dir = TempDir::new().unwrap();
    let path = require_tiff!(&dir.path().join("survey.tif"));

    let from_bytes = Dem::new(std::fs::read(&path).unwrap(), &options()).unwrap();
    assert_eq!(from_bytes.raster().path, None);
    assert_eq!(from_bytes.product(), None);
    assert_eq!(from_bytes.vref(), None);

    let dataset = Dataset::open(&path).unwrap();
    let from_dataset = Dem::new(&dataset, &options().with_vref_name("WGS84")).unwrap();
    assert_eq!(from_dataset.vref(), Some("WGS84"));
    assert_eq!(from_dataset.data(), from_bytes.data());
}

#[test]
fn multiband_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = require_tiff!(&dir.path().join("stack.tif"), 2);

    let err = Dem::open(&path, &options()).unwrap_err();
    assert!(matches!(err, Error::MultiBand { bands: 2 }));
    assert!(err.is_value_error());
}

#[test]
fn unreadable_file_is_invalid_input() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.tif");
    std::fs::write(&path, b"not a raster").unwrap();
    assert!(matches!(
        Dem::open(&path, &options()),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn written_dem_keeps_vertical_reference() {
    let dir = TempDir::new().unwrap();
    let path = require_tiff!(&dir.path().join("survey.tif"));
    let dem = Dem::open(&path, &options().with_vref_name("WGS84")).unwrap();

    let output = dir.path().join("written.tif");
    write_dem(&output, &dem).unwrap();

    let ds = Dataset::open(&output).unwrap();
    assert_eq!(ds.metadata_item("VREF", "").as_deref(), Some("WGS84"));
    assert_eq!(ds.metadata_item("VREF_GRID", ""), None);
    assert_eq!(
        ds.metadata_item("CONVERSION_TOOL", "").as_deref(),
        Some("demvref")
    );

    let reopened = Dem::open(&output, &options()).unwrap();
    assert_eq!(reopened.vref(), Some("WGS84"));
    assert_eq!(reopened.raster().nodata, Some(NODATA));
    assert_eq!(reopened.data(), dem.data());
}

#[test]
fn written_product_file_keeps_its_own_reference() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let path = require_tiff!(&input.path().join("N46E007.tif"));

    let dem = Dem::open(&path, &options().with_vref_name("WGS84")).unwrap();
    assert_eq!(dem.product(), Some("SRTMGL1"));
    let written = output.path().join("N46E007.tif");
    write_dem(&written, &dem).unwrap();

    let reopened = Dem::open(&written, &options()).unwrap();
    assert_eq!(reopened.product(), Some("SRTMGL1"));
    assert_eq!(reopened.vref(), Some("WGS84"));
    assert_eq!(reopened.vref_grid(), None);

    // The caller still wins over the tags
    let overridden = Dem::open(&written, &options().with_vref_name("EGM08")).unwrap();
    assert_eq!(overridden.vref(), Some("EGM08"));
}

#[test]
fn describe_reports_crs() {
    let dir = TempDir::new().unwrap();
    let path = require_tiff!(&dir.path().join("N46E007.tif"));

    let mut dem = Dem::open(&path, &options()).unwrap();
    let info = describe_dem(&mut dem);
    assert_eq!((info.width, info.height), (3, 2));
    assert_eq!(info.epsg, Some(4326));
    assert_eq!(info.tile_name.as_deref(), Some("N46E007"));
    let ccrs = info.compound_crs.unwrap();
    assert!(ccrs.contains(&format!("+geoidgrids={}", EGM96_GRID)), "{ccrs}");

    dem.set_vref(Some("WGS84"), None).unwrap();
    let info = describe_dem(&mut dem);
    assert_eq!(info.vref.as_deref(), Some("WGS84"));
    assert!(!info.compound_crs.unwrap().contains("geoidgrids"));
}

#[test]
fn gdalinfo_source_matches_native() {
    let dir = TempDir::new().unwrap();
    let path = require_tiff!(&dir.path().join("survey.tif"));

    let forced = DemOptions {
        crs_source: CrsSourceKind::GdalInfo,
        ..DemOptions::default()
    };
    let dem = Dem::open(&path, &forced).unwrap();
    match dem.horizontal_crs() {
        Ok(crs) => assert_eq!(crs.epsg().unwrap(), 4326),
        Err(Error::ExternalTool(e)) => eprintln!("SKIPPING: gdalinfo unavailable: {e}"),
        Err(e) => panic!("unexpected error: {e}"),
    }

    let missing = DemOptions {
        gdalinfo_program: "demvref-no-such-gdalinfo".to_string(),
        ..forced
    };
    let dem = Dem::open(&path, &missing).unwrap();
    assert!(matches!(dem.horizontal_crs(), Err(Error::ExternalTool(_))));
}

#[test]
fn custom_grid_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = require_tiff!(&dir.path().join("survey.tif"));
    let grids = TempDir::new().unwrap();
    write_gtx(&grids.path().join("offset.gtx"), UNDULATION);

    let opts = options()
        .with_vref_name("WGS84")
        .with_grid_data_dir(grids.path());
    let mut dem = Dem::open(&path, &opts).unwrap();

    match dem.to_vref(None, Some("offset.gtx")) {
        Ok(()) => {}
        Err(Error::ExternalTool(e)) => {
            eprintln!("SKIPPING: PROJ cannot use the synthetic grid: {e}");
            return;
        }
        Err(e) => panic!("unexpected error: {e}"),
    }
    assert_eq!(
        dem.vref(),
        Some("Unknown vertical reference name from: offset.gtx")
    );
    assert_eq!(dem.vref_grid(), Some("offset.gtx"));
    let expected = [90.0, 190.0, 290.0, NODATA, 490.0, 590.0];
    for (value, want) in dem.data().iter().zip(expected) {
        assert!((value - want).abs() < 1e-3, "{value} != {want}");
    }

    dem.to_vref(Some("WGS84"), None).unwrap();
    assert_eq!(dem.vref(), Some("WGS84"));
    for (value, want) in dem.data().iter().zip(VALUES) {
        assert!((value - want as f64).abs() < 1e-3, "{value} != {want}");
    }
}

#[test]
fn conversion_without_source_reference_fails() {
    let dir = TempDir::new().unwrap();
    let path = require_tiff!(&dir.path().join("survey.tif"));

    let mut dem = Dem::open(&path, &options()).unwrap();
    let err = dem.to_vref(Some("EGM96"), None).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidVerticalReference(VrefError::NoSourceReference)
    ));
    assert_eq!(dem.data()[[0, 0]], 100.0);
}

#[test]
fn batch_conversion_report() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    require_tiff!(&input.path().join("a_survey.tif"));
    require_tiff!(&input.path().join("b_survey.tif"));
    std::fs::write(input.path().join("readme.txt"), b"").unwrap();
    let grids = TempDir::new().unwrap();
    write_gtx(&grids.path().join("offset.gtx"), UNDULATION);

    let params = ConvertParams {
        vref_name: None,
        vref_grid: Some("offset.gtx".to_string()),
        source: options()
            .with_vref_name("WGS84")
            .with_grid_data_dir(grids.path()),
    };

    // Try the single file path first; PROJ may not accept the synthetic grid
    match convert_dem_to_path(
        &input.path().join("a_survey.tif"),
        &output.path().join("single.tif"),
        &params,
    ) {
        Ok(info) => assert_eq!(info.vref_grid.as_deref(), Some("offset.gtx")),
        Err(Error::ExternalTool(e)) => {
            eprintln!("SKIPPING: PROJ cannot use the synthetic grid: {e}");
            return;
        }
        Err(e) => panic!("unexpected error: {e}"),
    }

    let report = convert_directory_to_path(input.path(), output.path(), &params, true).unwrap();
    assert_eq!(
        report,
        BatchReport {
            processed: 2,
            skipped: 1,
            errors: 0
        }
    );
    let converted = Dem::open(output.path().join("b_survey.tif"), &options()).unwrap();
    assert_eq!(converted.vref_grid(), Some("offset.gtx"));
}
