//! Deferred setting accessors
//!
//! A [`Setting`] pairs a name with a default. Resolving it first checks the
//! override store; only when no override is present is the default used.
//! Nothing is cached: every resolution re-reads the store, so values set
//! after start-up (the selected target, the deploy timestamp) are observed
//! by every later call.

use crate::settings::Settings;
use crate::store::Override;
use serde_json::Value as JsonValue;
use std::fmt;
use std::rc::Rc;
use velcro_core::{Error, Result};

/// Deferred computation producing a setting value
///
/// Producers receive the settings context so they can derive values from
/// other settings. Returning [`Error::MissingSetting`] is how a required
/// setting reports that nobody supplied it.
pub type Producer = Rc<dyn Fn(&Settings) -> Result<JsonValue>>;

/// Default used when no override is present
#[derive(Clone)]
pub enum SettingDefault {
    /// Fixed value
    Literal(JsonValue),
    /// Value computed on every resolution
    Computed(Producer),
}

impl SettingDefault {
    /// Wrap a closure as a computed default
    pub fn computed<F>(producer: F) -> Self
    where
        F: Fn(&Settings) -> Result<JsonValue> + 'static,
    {
        Self::Computed(Rc::new(producer))
    }

    /// Default that always fails with a missing-setting error
    pub fn required(name: &str, message: &str) -> Self {
        let name = name.to_string();
        let message = message.to_string();
        Self::computed(move |_| Err(Error::missing(&name, &message)))
    }

    /// Default that resolves to nothing
    pub fn absent() -> Self {
        Self::Literal(JsonValue::Null)
    }
}

impl fmt::Debug for SettingDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<JsonValue> for SettingDefault {
    fn from(value: JsonValue) -> Self {
        Self::Literal(value)
    }
}

impl From<&str> for SettingDefault {
    fn from(value: &str) -> Self {
        Self::Literal(JsonValue::String(value.to_string()))
    }
}

impl From<bool> for SettingDefault {
    fn from(value: bool) -> Self {
        Self::Literal(JsonValue::Bool(value))
    }
}

/// Named, lazily resolved setting
#[derive(Debug, Clone)]
pub struct Setting {
    name: String,
    default: SettingDefault,
    interactive: bool,
}

impl Setting {
    /// Build the accessor for `name`
    pub fn new(name: impl Into<String>, default: impl Into<SettingDefault>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
            interactive: false,
        }
    }

    /// Mark the default as asking the operator
    ///
    /// Listings skip interactive defaults instead of prompting.
    #[must_use]
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Whether resolving the default asks the operator
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Setting name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve the current value
    ///
    /// An override wins over the default; a computed override or default is
    /// invoked on every call.
    pub fn resolve(&self, settings: &Settings) -> Result<JsonValue> {
        // Clone out of the store so the borrow ends before any producer runs;
        // producers are free to write back into the store.
        let current = settings.overrides().get(&self.name).cloned();

        match current {
            Some(Override::Value(value)) => {
                tracing::trace!(setting = %self.name, "resolved from override");
                Ok(value)
            }
            Some(Override::Computed(producer)) => {
                tracing::trace!(setting = %self.name, "resolved from computed override");
                producer(settings)
            }
            None => match &self.default {
                SettingDefault::Literal(value) => Ok(value.clone()),
                SettingDefault::Computed(producer) => {
                    tracing::trace!(setting = %self.name, "computing default");
                    producer(settings)
                }
            },
        }
    }
}
