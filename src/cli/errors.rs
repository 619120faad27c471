use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("No destination vertical reference: use --to-vref, --to-vref-grid or --config")]
    NoDestination,

    #[error("--sidecar requires a conversion with an --output file")]
    SidecarWithoutOutput,
}
