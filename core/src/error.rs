//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// Structural variants carry the operation, path or method that caused them so
/// the message can be acted upon without a debugger.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Wrapper for JSON (de)serialization errors.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// Wrapper for YAML (de)serialization errors.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),

    /// Invalid generator settings. Raised before any controller is processed.
    #[from(ignore)]
    #[display("Configuration Error: {_0}")]
    Config(String),

    /// The same HTTP method was registered twice on one path.
    #[from(ignore)]
    #[display(
        "The method '{method}' on path '{path}' is registered multiple times \
         (adjust the default URL template or the route attributes)"
    )]
    DuplicateOperation {
        /// Lower-case HTTP method.
        method: String,
        /// Normalized path.
        path: String,
    },

    /// An operation declares more than one body parameter.
    #[from(ignore)]
    #[display(
        "The operation '{operation_id}' has more than one body parameter \
         (at most one parameter may be bound from the request body)"
    )]
    MultipleBodyParameters {
        /// The offending operation id.
        operation_id: String,
    },

    /// Malformed reflection input (unknown type, bad type expression, ...).
    #[from(ignore)]
    #[display("Reflection Error: {_0}")]
    Reflection(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
