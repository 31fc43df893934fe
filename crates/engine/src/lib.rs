//! # Velcro Engine
//!
//! Task and hook machinery for the velcro deployment helpers.
//!
//! - **Hooks**: string-addressed side actions resolved through a registry
//! - **Tasks**: task bodies wrapped with fixed and call-time hook lists
//! - **Targets**: selecting the deployment target and deriving its paths
//! - **Built-ins**: the `velcro.utils` hooks and the stock tasks

pub mod builtin;
pub mod hooks;
pub mod report;
pub mod target;
pub mod task;

pub use velcro_core::{Error, Result};

pub use hooks::{DispatchReport, FailurePolicy, HookDispatcher, HookRegistry, HookStage};
pub use task::{HookedTask, TaskCall, TaskFn, TaskRegistry, TaskReport};

use velcro_config::Settings;

/// Settings, hooks and tasks of one run
#[derive(Debug)]
pub struct Engine {
    settings: Settings,
    hooks: HookRegistry,
    tasks: TaskRegistry,
}

impl Engine {
    /// Create an engine with the built-in hooks and tasks registered
    pub fn new(settings: Settings) -> Result<Self> {
        let mut hooks = HookRegistry::new();
        builtin::register_hooks(&mut hooks)?;
        let mut tasks = TaskRegistry::new();
        builtin::register_tasks(&mut tasks);

        tracing::debug!(hooks = hooks.len(), tasks = tasks.len(), "Engine ready");
        Ok(Self {
            settings,
            hooks,
            tasks,
        })
    }

    /// Settings context
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Hook registry
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Hook registry, for registering collaborator hooks
    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    /// Task registry
    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    /// Task registry, for registering collaborator tasks
    pub fn tasks_mut(&mut self) -> &mut TaskRegistry {
        &mut self.tasks
    }

    /// Select a deployment target
    ///
    /// A configuration error while deriving `base_path` is reported and
    /// the target stays selected.
    pub fn select_target(&self, name: &str) -> Result<()> {
        match builtin::set_target(&self.settings, name) {
            Err(e) if e.is_configuration() => {
                report::error(&e);
                Ok(())
            }
            other => other,
        }
    }

    /// Run a registered task with its own failure policy
    ///
    /// Returns `Ok(None)` when the task stopped on a configuration error,
    /// which has already been reported.
    pub fn run_task(&self, name: &str, call: &TaskCall) -> Result<Option<TaskReport>> {
        let task = self.tasks.require(name)?;
        self.run(task, call, task.failure_policy())
    }

    /// Run a registered task with an explicit failure policy
    pub fn run_task_with_policy(
        &self,
        name: &str,
        call: &TaskCall,
        policy: FailurePolicy,
    ) -> Result<Option<TaskReport>> {
        let task = self.tasks.require(name)?;
        self.run(task, call, policy)
    }

    fn run(&self, task: &HookedTask, call: &TaskCall, policy: FailurePolicy) -> Result<Option<TaskReport>> {
        match task.run_with_policy(&self.settings, &self.hooks, call, policy) {
            Ok(report) => Ok(Some(report)),
            Err(e) if e.is_configuration() => {
                tracing::debug!(task = %task.name(), error = %e, "Task stopped on configuration error");
                report::error(&e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
