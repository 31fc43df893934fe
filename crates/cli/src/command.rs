//! Command trait for velcro CLI
//!
//! Every subcommand receives the [`Engine`] built from the override file,
//! the `--set` overrides and the selected target.

use crate::error::Result;
use velcro_engine::Engine;

/// Trait for all velcro commands
pub trait Command {
    /// The type returned by this command
    type Output;

    /// Execute the command against a ready engine
    fn execute(&self, engine: &Engine) -> Result<Self::Output>;
}
