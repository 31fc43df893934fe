//! Config path command implementation

use clap::Args;
use std::path::PathBuf;
use velcro_engine::{Engine, report};

use crate::command::Command;
use crate::error::Result;

/// Config path command arguments
#[derive(Debug, Args)]
pub struct ConfigPathCommand {
    /// Print the path inside the local checkout instead
    #[arg(long)]
    pub local: bool,
}

impl Command for ConfigPathCommand {
    type Output = Option<PathBuf>;

    fn execute(&self, engine: &Engine) -> Result<Option<PathBuf>> {
        let settings = engine.settings();
        let (label, path) = if self.local {
            ("Local Config Path", settings.local_config_path())
        } else {
            ("Config Path", settings.config_path())
        };

        match path {
            Ok(path) => {
                report::labelled(label, &path.display().to_string());
                Ok(Some(path))
            }
            Err(e) if e.is_configuration() => {
                report::error(&e);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
