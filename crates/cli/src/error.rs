//! Error types for CLI commands

use thiserror::Error;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// Engine or settings error
    #[error(transparent)]
    Engine(#[from] velcro_core::Error),

    /// A `KEY=VALUE` argument without `=` or with an empty key
    #[error("Invalid assignment '{0}', expected KEY=VALUE")]
    InvalidAssignment(String),

    /// JSON output error
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI commands
pub type Result<T> = std::result::Result<T, CommandError>;
