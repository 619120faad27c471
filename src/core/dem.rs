//! The DEM entity: a single-band raster carrying a vertical reference.
//!
//! A DEM is built from a file, an open GDAL dataset, an in-memory file image
//! or an existing raster. Its vertical reference comes from the caller or, when
//! absent, from the product recognized in the file name. The compound CRS
//! (horizontal + vertical) is derived on demand from that state, and
//! [`Dem::to_vref`] converts elevations between two vertical references.
use std::path::{Path, PathBuf};

use gdal::Dataset;
use ndarray::{Array2, ArrayView2, Axis};
use tracing::info;

use crate::core::crs::{Crs, CrsSource, compound_crs};
use crate::core::params::DemOptions;
use crate::core::proj;
use crate::core::raster::Raster;
use crate::core::transform::{ElevationTransformer, GdalTransformer, transform_elevations};
use crate::core::vref::{VRefState, VrefError, parse_vref_from_product};
use crate::error::{Error, Result};
use crate::io::gdal::{open_raster, raster_from_bytes, read_raster};
use crate::io::satimg::{SatImgMetadata, parse_metadata_from_fn};
use crate::io::writers::metadata::{CONVERSION_TOOL_KEY, TOOL_NAME, VREF_GRID_KEY, VREF_KEY};

/// Anything a DEM can be built from
pub enum DemSource<'a> {
    Path(PathBuf),
    Dataset(&'a Dataset),
    /// Complete file image (e.g. GeoTIFF bytes)
    Bytes(Vec<u8>),
    Raster(Raster),
    /// Re-wrap an existing DEM as is
    Dem(Box<Dem>),
}

impl From<PathBuf> for DemSource<'_> {
    fn from(path: PathBuf) -> Self {
        DemSource::Path(path)
    }
}

impl From<&Path> for DemSource<'_> {
    fn from(path: &Path) -> Self {
        DemSource::Path(path.to_path_buf())
    }
}

impl From<&str> for DemSource<'_> {
    fn from(path: &str) -> Self {
        DemSource::Path(PathBuf::from(path))
    }
}

impl<'a> From<&'a Dataset> for DemSource<'a> {
    fn from(dataset: &'a Dataset) -> Self {
        DemSource::Dataset(dataset)
    }
}

impl From<Vec<u8>> for DemSource<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        DemSource::Bytes(bytes)
    }
}

impl From<Raster> for DemSource<'_> {
    fn from(raster: Raster) -> Self {
        DemSource::Raster(raster)
    }
}

impl From<Dem> for DemSource<'_> {
    fn from(dem: Dem) -> Self {
        DemSource::Dem(Box::new(dem))
    }
}

/// Digital elevation model with a vertical reference
#[derive(Debug, Clone)]
pub struct Dem {
    raster: Raster,
    satimg: SatImgMetadata,
    vref: VRefState,
    /// Compound CRS of the last access; cleared whenever `vref` changes
    ccrs: Option<Crs>,
    crs_source: CrsSource,
    grid_data_dir: Option<PathBuf>,
    silent: bool,
}

impl Dem {
    /// Build a DEM; a [`DemSource::Dem`] is returned untouched.
    pub fn new<'a>(source: impl Into<DemSource<'a>>, options: &DemOptions) -> Result<Self> {
        let invalid = |e: crate::io::GdalError| Error::InvalidInput(e.to_string());
        let mut raster = match source.into() {
            DemSource::Dem(dem) => return Ok(*dem),
            DemSource::Path(path) => open_raster(&path).map_err(invalid)?,
            DemSource::Dataset(dataset) => read_raster(dataset).map_err(invalid)?,
            DemSource::Bytes(bytes) => raster_from_bytes(bytes).map_err(invalid)?,
            DemSource::Raster(raster) => raster,
        };

        match raster.band_count() {
            0 => return Err(Error::InvalidInput("raster has no band".to_string())),
            1 => {}
            bands => return Err(Error::MultiBand { bands }),
        }
        if options.nodata.is_some() {
            raster.nodata = options.nodata;
        }

        let satimg = raster
            .file_name()
            .map(|name| parse_metadata_from_fn(&name))
            .unwrap_or_default();

        let mut dem = Dem {
            raster,
            satimg,
            vref: VRefState::new(options.vref_name.clone(), options.vref_grid.clone()),
            ccrs: None,
            crs_source: CrsSource::detect(options.crs_source, &options.gdalinfo_program),
            grid_data_dir: options.grid_data_dir.clone(),
            silent: options.silent,
        };
        if !dem.parse_vref_from_metadata() {
            dem.parse_vref_from_fn();
        }
        Ok(dem)
    }

    pub fn open<P: AsRef<Path>>(path: P, options: &DemOptions) -> Result<Self> {
        Self::new(path.as_ref(), options)
    }

    /// User input wins over the product name; an inferred geoid brings its grid.
    fn parse_vref_from_fn(&mut self) {
        let Some(product) = self.satimg.product.as_deref() else {
            return;
        };
        match (parse_vref_from_product(Some(product)), self.vref.vref.as_deref()) {
            (Some(vref), None) => {
                if !self.silent {
                    info!(
                        "From product name \"{}\": setting vertical reference as {}",
                        product, vref
                    );
                }
                self.vref.vref = Some(vref.to_string());
                if self.vref.vref_grid.is_none() {
                    self.vref.vref_grid = vref.grid().map(str::to_string);
                }
            }
            (Some(vref), Some(user)) => {
                if !self.silent {
                    info!(
                        "Leaving user input of {} for vertical reference despite reading {} from product name",
                        user, vref
                    );
                }
            }
            (None, _) => {
                if !self.silent {
                    info!(
                        "Could not find a vertical reference based on product name: \"{}\"",
                        product
                    );
                }
            }
        }
    }

    /// Files written by this crate record their vertical reference as metadata
    /// items, which then win over the product name. User input still wins.
    fn parse_vref_from_metadata(&mut self) -> bool {
        let metadata = &self.raster.metadata;
        if !self.vref.is_unset()
            || metadata.get(CONVERSION_TOOL_KEY).map(String::as_str) != Some(TOOL_NAME)
        {
            return false;
        }
        let vref = metadata.get(VREF_KEY).cloned();
        let vref_grid = metadata.get(VREF_GRID_KEY).cloned();
        if vref.is_none() && vref_grid.is_none() {
            return false;
        }
        if !self.silent {
            info!(
                "From {} metadata: setting vertical reference as {:?} (grid {:?})",
                TOOL_NAME, vref, vref_grid
            );
        }
        self.vref = VRefState::new(vref, vref_grid);
        true
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Elevations, shaped (rows, cols)
    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.raster.data.index_axis(Axis(0), 0)
    }

    pub fn shape(&self) -> (usize, usize) {
        self.raster.shape()
    }

    pub fn satimg(&self) -> &SatImgMetadata {
        &self.satimg
    }

    pub fn product(&self) -> Option<&str> {
        self.satimg.product.as_deref()
    }

    pub fn vref(&self) -> Option<&str> {
        self.vref.vref.as_deref()
    }

    pub fn vref_grid(&self) -> Option<&str> {
        self.vref.vref_grid.as_deref()
    }

    pub fn vref_state(&self) -> &VRefState {
        &self.vref
    }

    /// Compound CRS stored by the last [`Dem::compound_crs`] call, if still valid
    pub fn cached_compound_crs(&self) -> Option<&Crs> {
        self.ccrs.as_ref()
    }

    pub fn crs_source(&self) -> &CrsSource {
        &self.crs_source
    }

    /// Directories searched for geoid grids
    pub fn grid_data_dirs(&self) -> Vec<PathBuf> {
        proj::grid_data_dirs(self.grid_data_dir.as_deref())
    }

    pub fn horizontal_crs(&self) -> Result<Crs> {
        self.crs_source.horizontal_crs(&self.raster)
    }

    /// Compound CRS for the current vertical reference, recomputed on every call.
    ///
    /// `None` when the reference is unknown or is a name without a grid.
    pub fn compound_crs(&mut self) -> Result<Option<Crs>> {
        self.ccrs = self.build_compound_crs(&self.vref)?;
        Ok(self.ccrs.clone())
    }

    fn build_compound_crs(&self, state: &VRefState) -> Result<Option<Crs>> {
        if !state.is_ellipsoid() && state.vref_grid.is_none() {
            return Ok(None);
        }
        let horizontal = self.horizontal_crs()?;
        compound_crs(&horizontal, state, &self.grid_data_dirs())
    }

    fn resolve_vref(&self, vref_name: Option<&str>, vref_grid: Option<&str>) -> Result<VRefState> {
        let state = VRefState::from_setting(vref_name, vref_grid, &self.grid_data_dirs())?;
        let given = |s: Option<&str>| s.is_some_and(|s| !s.is_empty());
        if given(vref_name) && given(vref_grid) && !self.silent {
            info!(
                "Both a vertical reference name and vertical grid are provided: defaulting to using grid only."
            );
        }
        Ok(state)
    }

    /// Set the vertical reference from a canonical name or a geoid grid (grid wins).
    ///
    /// Elevations are left untouched; use [`Dem::to_vref`] to convert them.
    pub fn set_vref(&mut self, vref_name: Option<&str>, vref_grid: Option<&str>) -> Result<()> {
        self.vref = self.resolve_vref(vref_name, vref_grid)?;
        self.ccrs = None;
        Ok(())
    }

    /// Convert elevations to another vertical reference.
    ///
    /// Data and vertical reference are only updated once the whole array has
    /// been transformed; on error the DEM is unchanged.
    pub fn to_vref(&mut self, vref_name: Option<&str>, vref_grid: Option<&str>) -> Result<()> {
        self.to_vref_with(vref_name, vref_grid, GdalTransformer::boxed)
    }

    /// [`Dem::to_vref`] with a custom transformer factory
    pub fn to_vref_with<F>(
        &mut self,
        vref_name: Option<&str>,
        vref_grid: Option<&str>,
        make_transformer: F,
    ) -> Result<()>
    where
        F: FnOnce(&Crs, &Crs) -> Result<Box<dyn ElevationTransformer>>,
    {
        if self.vref.is_unset() {
            return Err(VrefError::NoSourceReference.into());
        }
        let source_ccrs = self
            .build_compound_crs(&self.vref)?
            .ok_or_else(|| VrefError::NoCompoundCrs(self.vref.vref.clone().unwrap_or_default()))?;

        let dest_state = self.resolve_vref(vref_name, vref_grid)?;
        let dest_ccrs = self
            .build_compound_crs(&dest_state)?
            .ok_or_else(|| VrefError::NoCompoundCrs(dest_state.vref.clone().unwrap_or_default()))?;

        let transformer = make_transformer(&source_ccrs, &dest_ccrs)?;
        let (xx, yy) = self.raster.coords_center();
        let transformed = transform_elevations(
            xx.view(),
            yy.view(),
            self.data(),
            |z| self.raster.is_nodata(z),
            transformer.as_ref(),
        )?;

        self.raster
            .data
            .index_axis_mut(Axis(0), 0)
            .assign(&transformed);
        self.vref = dest_state;
        self.ccrs = Some(dest_ccrs);
        Ok(())
    }

    /// Copy of the DEM, optionally with new elevations of the same shape.
    ///
    /// The vertical reference and the stored compound CRS are copied as is.
    pub fn copy(&self, new_array: Option<Array2<f64>>) -> Result<Dem> {
        let raster = self.raster.copy(new_array.map(|a| a.insert_axis(Axis(0))))?;
        Ok(Dem {
            raster,
            satimg: self.satimg.clone(),
            vref: self.vref.clone(),
            ccrs: self.ccrs.clone(),
            crs_source: self.crs_source.clone(),
            grid_data_dir: self.grid_data_dir.clone(),
            silent: self.silent,
        })
    }
}
