//! Base error types for velcro
//!
//! Every crate in the workspace reports failures through this enum so that
//! task boundaries can classify them (configuration problems are reported
//! and skipped, everything else aborts the run).

use std::path::PathBuf;
use thiserror::Error;

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// A required setting has no override and no usable default
    #[error("{message}")]
    MissingSetting {
        /// Setting name
        name: String,
        /// Message shown to the operator
        message: String,
    },

    /// A setting resolved to a value of the wrong shape
    #[error("Setting '{name}' must be {expected}, got {found}")]
    InvalidSetting {
        /// Setting name
        name: String,
        /// Expected value kind
        expected: &'static str,
        /// Kind that was actually found
        found: &'static str,
    },

    /// Override file exists but could not be read or parsed
    #[error("Failed to load overrides from {}: {message}", path.display())]
    OverrideLoad {
        /// Path of the override file
        path: PathBuf,
        /// Parser or reader message
        message: String,
    },

    /// Hook reference could not be resolved to a registered symbol
    #[error("Failed to import hook: {reference} ({reason})")]
    HookResolution {
        /// The hook reference as written
        reference: String,
        /// Why resolution failed
        reason: String,
    },

    /// Hook reference resolved to something that cannot be invoked
    #[error("{reference} is not callable")]
    HookNotCallable {
        /// The hook reference as written
        reference: String,
    },

    /// A resolved hook failed while running
    #[error("Hook {reference} failed: {message}")]
    HookFailed {
        /// The hook reference as written
        reference: String,
        /// Failure message from the hook body
        message: String,
    },

    /// Path pipeline could not be built
    #[error("Path build error: {0}")]
    PathBuild(String),

    /// No task registered under this name
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Create a missing-setting error with an operator-facing message
    pub fn missing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MissingSetting {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Whether this error belongs to the configuration class
    ///
    /// Task boundaries report these as a single line and keep going.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingSetting { .. } | Self::InvalidSetting { .. }
        )
    }

    /// Whether this error comes from hook resolution rather than hook execution
    pub fn is_hook_resolution(&self) -> bool {
        matches!(
            self,
            Self::HookResolution { .. } | Self::HookNotCallable { .. }
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
