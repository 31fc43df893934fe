//! Built-in hooks and tasks
//!
//! Registered by [`crate::Engine::new`]. Hooks live under the
//! `velcro.utils` module so they can be named in hook lists:
//!
//! ```text
//! velcro run deploy --post 'velcro.utils.print_config_path'
//! ```

use crate::hooks::HookRegistry;
use crate::report;
use crate::target::{KNOWN_TARGETS, select_target, title_case};
use crate::task::{HookedTask, TaskRegistry};
use chrono::Local;
use velcro_config::{Settings, keys};
use velcro_core::Result;
use velcro_core::value::render;

/// Module holding the built-in hooks
pub const UTILS_MODULE: &str = "velcro.utils";

/// Longest database user name MySQL accepts
pub const MAX_DB_USERNAME_LEN: usize = 16;

/// Register the built-in hooks
pub fn register_hooks(registry: &mut HookRegistry) -> Result<()> {
    registry.register(&format!("{UTILS_MODULE}.print_config_path"), print_config_path)?;
    registry.register(
        &format!("{UTILS_MODULE}.print_local_config_path"),
        print_local_config_path,
    )?;
    registry.register(&format!("{UTILS_MODULE}.log_timestamp"), log_timestamp)?;
    registry.register(&format!("{UTILS_MODULE}.check_scm"), check_scm)?;
    registry.register_value("velcro.VERSION", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}

/// Register the built-in tasks, one per known target included
pub fn register_tasks(tasks: &mut TaskRegistry) {
    for name in KNOWN_TARGETS {
        tasks.register(
            HookedTask::new(name, move |settings, _| set_target(settings, name))
                .description(format!("Set the target to {name}")),
        );
    }

    tasks.register(
        HookedTask::new("print_config_path", |settings, _| print_config_path(settings))
            .description("Print the remote config path"),
    );
    tasks.register(
        HookedTask::new("print_local_config_path", |settings, _| {
            print_local_config_path(settings)
        })
        .description("Print the config path in the local checkout"),
    );
    tasks.register(
        HookedTask::new("show_settings", |settings, call| show_settings(settings, &call.args))
            .description("Print resolved settings"),
    );
}

/// Select a target and announce it
pub fn set_target(settings: &Settings, name: &str) -> Result<()> {
    report::labelled("Set target", &title_case(name));
    select_target(settings, name, Local::now()).map(|_| ())
}

fn print_config_path(settings: &Settings) -> Result<()> {
    let path = settings.config_path()?;
    report::labelled("Config Path", &path.display().to_string());
    Ok(())
}

fn print_local_config_path(settings: &Settings) -> Result<()> {
    let path = settings.local_config_path()?;
    report::labelled("Local Config Path", &path.display().to_string());
    Ok(())
}

fn log_timestamp(settings: &Settings) -> Result<()> {
    let now = settings.string(keys::NOW_STR)?;
    tracing::info!(now = %now, "Timestamp");
    report::labelled("Timestamp", &now);
    Ok(())
}

/// Fail unless `scm` names a supported source control system
fn check_scm(settings: &Settings) -> Result<()> {
    let scm = settings.scm()?;
    tracing::debug!(scm = %scm, "Source control system supported");
    Ok(())
}

/// Print settings by name, or the whole catalog when `names` is empty
///
/// Settings that fail to resolve are listed with their error instead of
/// aborting the listing.
pub fn show_settings(settings: &Settings, names: &[String]) -> Result<()> {
    let snapshots = if names.is_empty() {
        settings.snapshot()
    } else {
        names.iter().map(|name| settings.snapshot_one(name)).collect()
    };

    for snapshot in snapshots {
        match (snapshot.value, snapshot.error) {
            (Some(value), _) => report::labelled(&snapshot.name, &render(&value)),
            (None, Some(error)) => report::labelled(&snapshot.name, &report::error_line(&error)),
            (None, None) => report::labelled(&snapshot.name, ""),
        }
    }
    Ok(())
}

/// Check a database user name
///
/// Non-word characters are stripped first; the name is valid when what
/// remains fits in [`MAX_DB_USERNAME_LEN`] characters.
pub fn validate_db_username(username: &str) -> bool {
    username
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .count()
        <= MAX_DB_USERNAME_LEN
}
