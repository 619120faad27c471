//! Command Line Interface (CLI) layer for demvref.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for describing a DEM, converting
//! a single file, and batch conversion of a directory. It wires user-provided
//! options to the library functionality exposed via `demvref::api`.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
