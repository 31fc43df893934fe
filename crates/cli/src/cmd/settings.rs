//! Settings command implementation
//!
//! Display resolved settings, all of them or the ones named.

use clap::Args;
use velcro_config::SettingSnapshot;
use velcro_engine::{Engine, builtin};

use crate::command::Command;
use crate::error::Result;

/// Settings command arguments
#[derive(Debug, Args)]
pub struct SettingsCommand {
    /// Settings to show (default: every known setting)
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

impl SettingsCommand {
    fn snapshots(&self, engine: &Engine) -> Vec<SettingSnapshot> {
        let settings = engine.settings();
        if self.names.is_empty() {
            settings.snapshot()
        } else {
            self.names
                .iter()
                .map(|name| settings.snapshot_one(name))
                .collect()
        }
    }
}

impl Command for SettingsCommand {
    type Output = ();

    fn execute(&self, engine: &Engine) -> Result<()> {
        if self.json {
            let json = serde_json::to_string_pretty(&self.snapshots(engine))?;
            println!("{json}");
            return Ok(());
        }
        builtin::show_settings(engine.settings(), &self.names)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use velcro_config::{OverrideStore, Settings};

    #[test]
    fn test_named_snapshots() {
        let engine = Engine::new(Settings::new(OverrideStore::new())).unwrap();
        let cmd = SettingsCommand {
            names: vec!["config_dir".to_string(), "target".to_string()],
            json: true,
        };

        let snapshots = cmd.snapshots(&engine);
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].value, Some(serde_json::json!("config")));
        assert_eq!(snapshots[1].error.as_deref(), Some("Missing Target"));
        assert!(cmd.execute(&engine).is_ok());
    }

    #[test]
    fn test_all_snapshots() {
        let engine = Engine::new(Settings::new(OverrideStore::new())).unwrap();
        let cmd = SettingsCommand {
            names: Vec::new(),
            json: false,
        };
        assert_eq!(cmd.snapshots(&engine).len(), engine.settings().names().count());
        assert!(cmd.execute(&engine).is_ok());
    }
}
