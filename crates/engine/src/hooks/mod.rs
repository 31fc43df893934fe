//! Hook system
//!
//! Hooks are named side-actions that run before or after a task. They are
//! addressed by string reference (`pkg.module.function` or
//! `pkg.module:function`) and resolved against a [`HookRegistry`] filled in
//! at start-up.
//!
//! ## Module Organization
//!
//! - `reference`: parsing hook references and `|`-separated hook lists
//! - `registry`: reference → hook table
//! - `dispatcher`: ordered invocation with per-reference failure isolation

pub mod dispatcher;
pub mod reference;
pub mod registry;

pub use dispatcher::{DispatchReport, FailurePolicy, HookDispatcher};
pub use reference::{HookReference, LIST_SEPARATOR, split_list};
pub use registry::{HookFn, HookRegistry, HookSymbol};

/// Hook execution stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookStage {
    /// Before the task body
    Pre,
    /// After the task body
    Post,
}

impl HookStage {
    /// Get the string name of this hook stage
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            HookStage::Pre => "pre",
            HookStage::Post => "post",
        }
    }
}
