use clap::Parser;
use std::path::PathBuf;

use demvref::{CrsSourceKind, VRefName};

#[derive(Parser, Debug)]
#[command(
    name = "demvref",
    version,
    about = "Describe DEMs and convert them between vertical references"
)]
pub struct CliArgs {
    /// Input DEM (single file mode)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Input directory containing GeoTIFF DEMs (batch mode)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output GeoTIFF (single file mode)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output directory for batch conversion (batch mode)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Vertical reference of the input, overriding the one inferred from the product name
    #[arg(long, value_enum)]
    pub vref: Option<VRefName>,

    /// Geoid grid of the input (wins over --vref)
    #[arg(long)]
    pub vref_grid: Option<String>,

    /// Destination vertical reference
    #[arg(long, value_enum)]
    pub to_vref: Option<VRefName>,

    /// Destination geoid grid (wins over --to-vref)
    #[arg(long)]
    pub to_vref_grid: Option<String>,

    /// Directory holding the PROJ geoid grids (defaults to the PROJ data directory)
    #[arg(long)]
    pub grid_dir: Option<PathBuf>,

    /// How the horizontal CRS is read (auto, native or gdal-info)
    #[arg(long, value_enum)]
    pub crs_source: Option<CrsSourceKind>,

    /// JSON file with conversion parameters; command line flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the DEM description as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Write a JSON sidecar next to the output GeoTIFF
    #[arg(long, default_value_t = false)]
    pub sidecar: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,

    /// Batch mode: continue converting other files when one fails
    #[arg(long, default_value_t = false)]
    pub batch: bool,
}
