//! Velcro CLI library
//!
//! This library contains all the CLI logic for velcro, making it reusable
//! for testing and integration with other tools.

pub mod cmd;
pub mod command;
pub mod error;
pub mod prompt;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use velcro_config::{OverrideStore, Settings};
use velcro_engine::Engine;

use command::Command;
use prompt::DialoguerPrompter;

/// Velcro - settings and hooks for deployment tasks
#[derive(Parser)]
#[command(name = "velcro")]
#[command(about = "Resolve deployment settings and run tasks with hooks")]
#[command(version)]
#[command(long_about = "Resolve deployment settings and run tasks with hooks

Settings come from ~/.velcro.yml, --set overrides and computed defaults.
Any task can run extra hooks before and after it:

  velcro --target live run print_config_path --pre 'velcro.utils.log_timestamp'")]
pub struct Cli {
    /// Path to the override file (default: ~/.velcro.yml)
    #[arg(long, env = "VELCRO_OVERRIDES", value_name = "FILE")]
    pub overrides: Option<PathBuf>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "VELCRO_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Select a deployment target before running the command
    #[arg(short, long, value_name = "NAME")]
    pub target: Option<String>,

    /// Override a setting; the value is read as YAML (`true`, `3`, `[a, b]`)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, JsonValue)>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for velcro CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Run a task with optional pre/post hooks
    Run(cmd::run::RunCommand),

    /// Print the config path of the selected target
    ConfigPath(cmd::config_path::ConfigPathCommand),

    /// Show resolved settings
    Settings(cmd::settings::SettingsCommand),

    /// List registered hooks
    Hooks(cmd::hooks::HooksCommand),

    /// List registered tasks
    Tasks(cmd::tasks::TasksCommand),
}

/// Parse a `KEY=VALUE` runtime override
///
/// The value is read as a YAML scalar or flow collection; an empty value is
/// an empty string.
pub fn parse_assignment(input: &str) -> std::result::Result<(String, JsonValue), String> {
    let Some((key, value)) = input.split_once('=') else {
        return Err(error::CommandError::InvalidAssignment(input.to_string()).to_string());
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(error::CommandError::InvalidAssignment(input.to_string()).to_string());
    }

    let value = if value.is_empty() {
        JsonValue::String(String::new())
    } else {
        serde_yaml::from_str(value).unwrap_or_else(|_| JsonValue::String(value.to_string()))
    };
    Ok((key.to_string(), value))
}

/// Locate the override file from the command line or the home directory
fn override_path(cli: &Cli) -> Result<PathBuf> {
    cli.overrides
        .clone()
        .or_else(velcro_config::default_override_file)
        .context("Could not determine the override file (home directory not found). Please specify with --overrides.")
}

/// Build the settings context: override file, then `--set` overrides
pub fn load_settings(path: &Path, assignments: &[(String, JsonValue)]) -> Result<Settings> {
    let mut store = OverrideStore::from_file(path)
        .with_context(|| format!("Failed to load overrides from {}", path.display()))?;
    tracing::debug!(path = %path.display(), overrides = store.len(), "Loaded override file");

    store.merge(assignments.iter().cloned());

    Ok(Settings::builder(store)
        .prompter(Rc::new(DialoguerPrompter))
        .build())
}

/// Execute the command based on the command type
fn execute_command(command: &Commands, engine: &Engine) -> Result<()> {
    match command {
        Commands::Run(run_cmd) => {
            run_cmd.execute(engine)?;
        }
        Commands::ConfigPath(path_cmd) => {
            path_cmd.execute(engine)?;
        }
        Commands::Settings(settings_cmd) => {
            settings_cmd.execute(engine)?;
        }
        Commands::Hooks(hooks_cmd) => {
            hooks_cmd.execute(engine)?;
        }
        Commands::Tasks(tasks_cmd) => {
            tasks_cmd.execute(engine)?;
        }
    }

    Ok(())
}

/// Main entry point for the CLI logic
///
/// # Errors
///
/// Returns an error if:
/// - Logging initialization fails
/// - The override file cannot be read or parsed
/// - Command execution fails
pub fn run(cli: Cli) -> Result<()> {
    velcro_config::logging::init(cli.verbose, cli.log_file.as_deref())?;

    let path = override_path(&cli)?;
    let settings = load_settings(&path, &cli.set)?;
    let engine = Engine::new(settings).context("Failed to register built-in hooks")?;

    if let Some(target) = &cli.target {
        engine.select_target(target)?;
    }

    execute_command(&cli.command, &engine)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_assignment_types() {
        assert_eq!(parse_assignment("target=live").unwrap(), ("target".to_string(), json!("live")));
        assert_eq!(
            parse_assignment("nginx_symlink_sudo=true").unwrap().1,
            json!(true)
        );
        assert_eq!(parse_assignment("port=3").unwrap().1, json!(3));
        assert_eq!(parse_assignment("directories=[src, logs]").unwrap().1, json!(["src", "logs"]));
        assert_eq!(parse_assignment("host=").unwrap().1, json!(""));
        assert_eq!(parse_assignment("url=a=b").unwrap(), ("url".to_string(), json!("a=b")));
    }

    #[test]
    fn test_parse_assignment_rejects_bad_input() {
        assert!(parse_assignment("no_equals").is_err());
        assert!(parse_assignment("=value").is_err());
    }

    #[test]
    fn test_cli_parses_global_options() {
        let cli = Cli::try_parse_from([
            "velcro",
            "--target",
            "stage",
            "--set",
            "project=shop",
            "--set",
            "client=acme",
            "run",
            "print_config_path",
            "--pre",
            "velcro.utils.log_timestamp",
            "--best-effort",
        ])
        .unwrap();

        assert_eq!(cli.target.as_deref(), Some("stage"));
        assert_eq!(cli.set.len(), 2);
        match cli.command {
            Commands::Run(run) => {
                assert_eq!(run.task, "print_config_path");
                assert_eq!(run.pre.as_deref(), Some("velcro.utils.log_timestamp"));
                assert!(run.best_effort);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_set() {
        assert!(Cli::try_parse_from(["velcro", "--set", "oops", "tasks"]).is_err());
    }

    #[test]
    #[serial]
    fn test_overrides_flag_beats_env() {
        temp_env::with_var("VELCRO_OVERRIDES", Some("/tmp/from-env.yml"), || {
            let cli = Cli::try_parse_from(["velcro", "hooks"]).unwrap();
            assert_eq!(override_path(&cli).unwrap(), PathBuf::from("/tmp/from-env.yml"));

            let cli = Cli::try_parse_from(["velcro", "--overrides", "/tmp/flag.yml", "hooks"]).unwrap();
            assert_eq!(override_path(&cli).unwrap(), PathBuf::from("/tmp/flag.yml"));
        });
    }

    #[test]
    fn test_load_settings_applies_assignments_last() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("overrides.yml");
        fs::write(&path, "mysql:\n  root_user: root\nconfig:\n  dir: conf\n").unwrap();

        let settings = load_settings(&path, &[("config_dir".to_string(), json!("etc"))]).unwrap();

        assert_eq!(settings.string("mysql_root_user").unwrap(), "root");
        assert_eq!(settings.string("config_dir").unwrap(), "etc");
    }

    #[test]
    fn test_load_settings_missing_file() {
        let temp = TempDir::new().unwrap();
        let settings = load_settings(&temp.path().join("absent.yml"), &[]).unwrap();
        assert_eq!(settings.overrides().len(), 0);
    }

    #[test]
    fn test_load_settings_malformed_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.yml");
        fs::write(&path, "mysql: [unclosed\n").unwrap();
        assert!(load_settings(&path, &[]).is_err());
    }
}
