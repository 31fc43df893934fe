//! Settings resolution for velcro
//!
//! This crate handles:
//! - Loading and flattening the override file
//! - The override store
//! - Deferred setting accessors and the settings catalog
//! - Config path pipelines
//! - Logging initialization

pub mod dirs;
pub mod logging;
pub mod overrides;
pub mod pipeline;
pub mod setting;
pub mod settings;
pub mod store;

// Re-export error types from core
pub use velcro_core::{Error, Result};

// Re-export main types
pub use dirs::default_override_file;
pub use overrides::{OverrideDocument, OverrideFormat};
pub use setting::{Producer, Setting, SettingDefault};
pub use settings::{Prompter, SettingSnapshot, Settings, SettingsBuilder, keys};
pub use store::{Override, OverrideStore};
