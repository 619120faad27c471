use std::path::Path;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use demvref::api::{DemInfo, convert_dem_to_path, convert_directory_to_path, describe_dem, open_dem};
use demvref::io::writers::metadata::write_json_sidecar;
use demvref::ConvertParams;

use super::args::CliArgs;
use super::errors::AppError;

/// Merge the optional config file with the command line flags (flags win)
fn build_params(args: &CliArgs) -> Result<ConvertParams, Box<dyn std::error::Error>> {
    let mut params = match &args.config {
        Some(path) => {
            info!("Loading parameters from {:?}", path);
            ConvertParams::from_json_file(path)?
        }
        None => ConvertParams::default(),
    };

    if let Some(vref) = args.vref {
        params.source.vref_name = Some(vref.to_string());
    }
    if let Some(grid) = &args.vref_grid {
        params.source.vref_grid = Some(grid.clone());
    }
    if args.to_vref.is_some() || args.to_vref_grid.is_some() {
        params.vref_name = args.to_vref.map(|v| v.to_string());
        params.vref_grid = args.to_vref_grid.clone();
    }
    if let Some(dir) = &args.grid_dir {
        params.source.grid_data_dir = Some(dir.clone());
    }
    if let Some(kind) = args.crs_source {
        params.source.crs_source = kind;
    }
    if args.log {
        params.source.silent = false;
    }
    Ok(params)
}

fn print_info(info: &DemInfo, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(info)?);
        return Ok(());
    }
    let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    println!("Path:               {:?}", info.path);
    println!("Size:               {} x {}", info.width, info.height);
    println!("Product:            {}", show(&info.product));
    println!("Sensor:             {}", show(&info.sensor));
    println!("Tile:               {}", show(&info.tile_name));
    println!("Vertical reference: {}", show(&info.vref));
    println!("Vertical grid:      {}", show(&info.vref_grid));
    println!(
        "Horizontal EPSG:    {}",
        info.epsg.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())
    );
    println!("Compound CRS:       {}", show(&info.compound_crs));
    Ok(())
}

fn describe_single_file(
    input: &Path,
    params: &ConvertParams,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dem = open_dem(input, &params.source)?;
    let info = describe_dem(&mut dem);
    print_info(&info, json)
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .init();
    }

    let params = build_params(&args)?;
    let converting =
        args.to_vref.is_some() || args.to_vref_grid.is_some() || args.config.is_some();
    let batch_mode = args.batch || args.input_dir.is_some();

    if batch_mode {
        let input_dir = args.input_dir.ok_or(AppError::MissingArgument {
            arg: "--input-dir".to_string(),
        })?;
        let output_dir = args.output_dir.ok_or(AppError::MissingArgument {
            arg: "--output-dir".to_string(),
        })?;
        if !converting {
            return Err(AppError::NoDestination.into());
        }
        if args.sidecar {
            warn!("--sidecar is only applied in single file mode");
        }

        info!("Starting batch conversion from directory: {:?}", input_dir);
        info!("Output directory: {:?}", output_dir);
        let report = convert_directory_to_path(&input_dir, &output_dir, &params, args.batch)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!(
                "processed={} skipped={} errors={}",
                report.processed, report.skipped, report.errors
            );
        }
    } else {
        let input = args.input.ok_or(AppError::MissingArgument {
            arg: "--input".to_string(),
        })?;

        if !converting {
            if args.sidecar {
                return Err(AppError::SidecarWithoutOutput.into());
            }
            return describe_single_file(&input, &params, args.json);
        }

        let output = args.output.ok_or(AppError::MissingArgument {
            arg: "--output".to_string(),
        })?;
        let info = convert_dem_to_path(&input, &output, &params)?;
        if args.sidecar {
            write_json_sidecar(&output, &info)?;
        }
        print_info(&info, args.json)?;
        info!("Successfully converted: {:?} -> {:?}", input, output);
    }

    Ok(())
}
