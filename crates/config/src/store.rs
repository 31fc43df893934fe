//! Override store
//!
//! The single mutable table behind every setting. It is seeded once from the
//! override file and then written to directly at runtime, e.g. when a target
//! is selected.

use crate::overrides;
use crate::setting::Producer;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use velcro_core::Result;

/// An explicitly supplied setting value
#[derive(Clone)]
pub enum Override {
    /// Plain value
    Value(JsonValue),
    /// Producer invoked on every resolution
    Computed(Producer),
}

impl fmt::Debug for Override {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Name to override table
#[derive(Debug, Clone, Default)]
pub struct OverrideStore {
    entries: IndexMap<String, Override>,
}

impl OverrideStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded from an override file
    ///
    /// A missing file yields an empty store.
    pub fn from_file(path: &Path) -> Result<Self> {
        let document = overrides::load(path)?;
        let mut store = Self::new();
        store.merge(overrides::flatten(&document));
        Ok(store)
    }

    /// Merge flattened values, replacing existing entries with the same name
    pub fn merge<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (String, JsonValue)>,
    {
        for (name, value) in values {
            self.entries.insert(name, Override::Value(value));
        }
    }

    /// Set a plain value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) {
        self.entries.insert(name.into(), Override::Value(value.into()));
    }

    /// Set a producer that runs on every resolution
    pub fn set_computed(&mut self, name: impl Into<String>, producer: Producer) {
        self.entries.insert(name.into(), Override::Computed(producer));
    }

    /// Get the raw override
    pub fn get(&self, name: &str) -> Option<&Override> {
        self.entries.get(name)
    }

    /// Get a plain override value (computed overrides are not evaluated)
    pub fn value(&self, name: &str) -> Option<JsonValue> {
        match self.entries.get(name)? {
            Override::Value(value) => Some(value.clone()),
            Override::Computed(_) => None,
        }
    }

    /// Remove an override, returning it
    pub fn remove(&mut self, name: &str) -> Option<Override> {
        self.entries.shift_remove(name)
    }

    /// Check whether an override is present
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names of all overrides in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of overrides
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, JsonValue)> for OverrideStore {
    fn from_iter<T: IntoIterator<Item = (String, JsonValue)>>(iter: T) -> Self {
        let mut store = Self::new();
        store.merge(iter);
        store
    }
}

/// Wrap a closure as a [`Producer`]
pub fn producer<F>(f: F) -> Producer
where
    F: Fn(&crate::Settings) -> Result<JsonValue> + 'static,
{
    Rc::new(f)
}
