#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use oasgen_core::AppError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// Failure inside the generation pipeline.
    #[display("{}", _0)]
    App(AppError),

    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// No candidate snapshot file could be loaded.
    #[from(ignore)]
    #[display("No reflection snapshot found (tried: {})", _0)]
    SnapshotNotFound(String),

    /// The settings file could not be read or parsed.
    #[from(ignore)]
    #[display("Invalid settings file '{}': {}", _0, _1)]
    Settings(String, String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;
