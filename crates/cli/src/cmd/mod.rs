//! CLI command implementations

pub mod config_path;
pub mod hooks;
pub mod run;
pub mod settings;
pub mod tasks;
