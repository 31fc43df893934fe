//! Hook registry
//!
//! Hooks are looked up by reference in an explicit table populated at
//! start-up. Modules group symbols; a symbol is either a hook function or a
//! plain value (which resolves, but cannot be invoked).

use super::reference::HookReference;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::fmt;
use std::rc::Rc;
use velcro_config::Settings;
use velcro_core::{Error, Result};

/// A hook body
pub type HookFn = Rc<dyn Fn(&Settings) -> Result<()>>;

/// Symbol exported by a hook module
#[derive(Clone)]
pub enum HookSymbol {
    /// Invokable hook
    Function(HookFn),
    /// Value exported alongside hooks
    Value(JsonValue),
}

impl fmt::Debug for HookSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Function(..)"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// Reference → hook table
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    modules: IndexMap<String, IndexMap<String, HookSymbol>>,
}

impl HookRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook function under `reference`
    ///
    /// Re-registering a reference replaces the previous symbol.
    pub fn register<F>(&mut self, reference: &str, hook: F) -> Result<()>
    where
        F: Fn(&Settings) -> Result<()> + 'static,
    {
        self.insert(reference, HookSymbol::Function(Rc::new(hook)))
    }

    /// Register a non-invokable value under `reference`
    pub fn register_value(&mut self, reference: &str, value: impl Into<JsonValue>) -> Result<()> {
        self.insert(reference, HookSymbol::Value(value.into()))
    }

    fn insert(&mut self, reference: &str, symbol: HookSymbol) -> Result<()> {
        let parsed = HookReference::parse(reference)?;
        tracing::debug!("Registering hook symbol {}", parsed);
        self.modules
            .entry(parsed.module().to_string())
            .or_default()
            .insert(parsed.function().to_string(), symbol);
        Ok(())
    }

    /// Resolve a reference to an invokable hook
    ///
    /// Fails with [`Error::HookResolution`] for malformed references, unknown
    /// modules and unknown functions, and with [`Error::HookNotCallable`]
    /// when the reference names a value.
    pub fn resolve(&self, reference: &str) -> Result<HookFn> {
        let parsed = HookReference::parse(reference)?;

        let Some(module) = self.modules.get(parsed.module()) else {
            return Err(Error::HookResolution {
                reference: reference.to_string(),
                reason: format!("no module named '{}'", parsed.module()),
            });
        };

        match module.get(parsed.function()) {
            Some(HookSymbol::Function(hook)) => Ok(Rc::clone(hook)),
            Some(HookSymbol::Value(_)) => Err(Error::HookNotCallable {
                reference: reference.to_string(),
            }),
            None => Err(Error::HookResolution {
                reference: reference.to_string(),
                reason: format!(
                    "module '{}' has no attribute '{}'",
                    parsed.module(),
                    parsed.function()
                ),
            }),
        }
    }

    /// Check whether a module is registered
    pub fn has_module(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    /// All registered references, with whether each is invokable
    pub fn references(&self) -> Vec<(String, bool)> {
        self.modules
            .iter()
            .flat_map(|(module, symbols)| {
                symbols.iter().map(move |(name, symbol)| {
                    (
                        format!("{module}.{name}"),
                        matches!(symbol, HookSymbol::Function(_)),
                    )
                })
            })
            .collect()
    }

    /// Number of registered symbols
    pub fn len(&self) -> usize {
        self.modules.values().map(IndexMap::len).sum()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
