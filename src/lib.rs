#![doc = r#"
demvref: vertical references for digital elevation models.

This crate attaches a vertical reference (the WGS84 ellipsoid, or the EGM96 / EGM08
geoids, or any PROJ geoid grid) to single-band DEM rasters, builds the matching
compound (horizontal + vertical) CRS, and converts elevations from one vertical
reference to another through GDAL/PROJ. It powers the `demvref` CLI and can be
embedded in your own Rust applications.

Stability
---------
The public library API is experimental in initial releases and may evolve as the
crate stabilizes. Breaking changes can occur.

Requirements
------------
- GDAL development headers and runtime available on your system.
- PROJ geoid grids (`proj-data`) for EGM96/EGM08 or custom grids.
- Rust 2024 edition toolchain.

Add dependency
--------------
```toml
[dependencies]
demvref = "0.1"
```

Quick start: convert a DEM to a file
------------------------------------
```rust,no_run
use std::path::Path;
use demvref::{convert_dem_to_path, ConvertParams, DemOptions};

fn main() -> demvref::Result<()> {
    let params = ConvertParams {
        vref_name: Some("EGM08".to_string()),
        vref_grid: None,
        // Source reference is inferred from the product name when not given
        source: DemOptions::default(),
    };

    let info = convert_dem_to_path(
        Path::new("/data/N46E007.hgt"),
        Path::new("/out/N46E007_egm08.tif"),
        &params,
    )?;
    println!("{:?} -> {:?}", info.path, info.vref);
    Ok(())
}
```

Work with a DEM in memory
-------------------------
```rust,no_run
use demvref::{Dem, DemOptions};

fn main() -> demvref::Result<()> {
    let options = DemOptions::default().with_vref_name("WGS84").with_silent(false);
    let mut dem = Dem::open("/data/my_survey.tif", &options)?;

    // Compound CRS of the ellipsoid is the horizontal CRS itself
    let ccrs = dem.compound_crs()?;
    println!("{:?}", ccrs.map(|c| c.definition().to_string()));

    // Ellipsoid heights to EGM96 geoid heights, in place
    dem.to_vref(Some("EGM96"), None)?;
    assert_eq!(dem.vref(), Some("EGM96"));
    Ok(())
}
```

Batch helpers
-------------
```rust,no_run
use std::path::Path;
use demvref::{convert_directory_to_path, ConvertParams};

fn main() -> demvref::Result<()> {
    let report = convert_directory_to_path(
        Path::new("/data/tiles"),
        Path::new("/out/tiles"),
        &ConvertParams::default(),
        true, // continue_on_error
    )?;

    println!("processed={} skipped={} errors={}", report.processed, report.skipped, report.errors);
    Ok(())
}
```

Error handling
--------------
All public functions return `demvref::Result<T>`; match on `demvref::Error` to handle
specific cases, e.g. invalid vertical references or multi-band rasters.

```rust,no_run
use demvref::{Dem, DemOptions, Error, VrefError};

fn main() {
    let mut dem = match Dem::open("/data/my_survey.tif", &DemOptions::default()) {
        Ok(dem) => dem,
        Err(Error::MultiBand { bands }) => return eprintln!("{bands} bands, expected one"),
        Err(other) => return eprintln!("Other error: {other}"),
    };

    match dem.set_vref(None, Some("nonexistent_grid.tif")) {
        Ok(()) => {}
        Err(Error::InvalidVerticalReference(VrefError::GridNotFound { grid, .. })) => {
            eprintln!("Install {grid} from PROJ-data")
        }
        Err(other) => eprintln!("Other error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`]: high-level, ergonomic entry points.
- [`core`]: the DEM entity, vertical reference resolution, CRS construction and conversion.
- [`types`]: enums and constants (e.g. `VRefName`, `CrsSourceKind`, well-known grids).
- [`io`]: GDAL readers, file name parsing and writers.
- [`error`]: crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use core::crs::{Crs, CrsSource};
pub use core::dem::{Dem, DemSource};
pub use core::params::{ConvertParams, DemOptions};
pub use core::raster::Raster;
pub use core::transform::{ElevationTransformer, GdalTransformer};
pub use core::vref::{VRefState, VrefError, parse_vref_from_product};
pub use error::{Error, Result};
pub use types::{CrsSourceKind, EGM08_GRID, EGM96_GRID, VRefName};

// Readers
pub use io::gdal::{GdalError, GdalMetadata};
pub use io::satimg::{SatImgMetadata, parse_metadata_from_fn};

// Selected writer helpers
pub use io::writers::metadata::{embed_tiff_metadata, extract_metadata_fields, write_json_sidecar};
pub use io::writers::tiff::write_dem;

// High-level API re-exports
pub use api::{
    BatchReport, DemInfo, convert_dem_to_path, convert_directory_to_path, describe_dem,
    is_dem_file, open_dem,
};
