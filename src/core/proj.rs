//! Introspection of the PROJ library linked through GDAL: release version and
//! the directory holding geoid grid files.
use std::collections::HashSet;
use std::ffi::CStr;
use std::os::raw::c_int;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Release of the linked PROJ library
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjVersion {
    pub major: i32,
    pub minor: i32,
    pub patch: i32,
}

impl ProjVersion {
    /// Oldest release reading every CRS flavour directly from a dataset
    pub const NATIVE_CRS_MIN: ProjVersion = ProjVersion::new(7, 2, 0);

    pub const fn new(major: i32, minor: i32, patch: i32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn linked() -> Self {
        let (mut major, mut minor, mut patch): (c_int, c_int, c_int) = (0, 0, 0);
        // SAFETY: the three pointers are valid for writes for the whole call.
        unsafe { gdal_sys::OSRGetPROJVersion(&mut major, &mut minor, &mut patch) };
        Self::new(major, minor, patch)
    }

    pub fn supports_native_crs(&self) -> bool {
        *self >= Self::NATIVE_CRS_MIN
    }
}

impl std::fmt::Display for ProjVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Directories PROJ searches for resource files, in priority order
pub fn proj_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    // SAFETY: PROJ returns a null-terminated list of C strings owned by the
    // caller, released with CSLDestroy once copied.
    unsafe {
        let list = gdal_sys::OSRGetPROJSearchPaths();
        if list.is_null() {
            return paths;
        }
        let mut i = 0;
        loop {
            let item = *list.add(i);
            if item.is_null() {
                break;
            }
            paths.push(PathBuf::from(CStr::from_ptr(item).to_string_lossy().into_owned()));
            i += 1;
        }
        gdal_sys::CSLDestroy(list);
    }
    paths
}

/// Directories where geoid grids are looked up, in priority order.
///
/// An explicit override is searched alone. Otherwise: `PROJ_DATA`, `PROJ_LIB`,
/// then every existing PROJ search path.
pub fn grid_data_dirs(override_dir: Option<&Path>) -> Vec<PathBuf> {
    if let Some(dir) = override_dir {
        return vec![dir.to_path_buf()];
    }
    let mut dirs = Vec::new();
    for var in ["PROJ_DATA", "PROJ_LIB"] {
        if let Some(value) = std::env::var_os(var).filter(|v| !v.is_empty()) {
            // May hold several entries, like PATH
            dirs.extend(std::env::split_paths(&value).filter(|p| p.is_dir()));
        }
    }
    dirs.extend(proj_search_paths().into_iter().filter(|p| p.is_dir()));

    let mut seen = HashSet::new();
    dirs.retain(|d| seen.insert(d.clone()));
    debug!("Grid data directories: {:?}", dirs);
    dirs
}

/// Full path of `grid` in the first directory of `dirs` holding it
pub fn find_grid(grid: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter().map(|d| d.join(grid)).find(|p| p.is_file())
}
