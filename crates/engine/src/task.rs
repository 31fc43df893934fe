//! Hook-aware tasks
//!
//! A [`HookedTask`] wraps a task body with two hook lists per stage: a fixed
//! list given when the task is defined, and a list passed at call time as a
//! `|`-separated `pre`/`post` argument. Execution order:
//!
//! 1. fixed pre-hooks, then call-time pre-hooks
//! 2. the task body, without the `pre`/`post` arguments
//! 3. call-time post-hooks, then fixed post-hooks
//!
//! Under [`FailurePolicy::FailFast`] a failing body skips the post-hooks.

use crate::hooks::{DispatchReport, FailurePolicy, HookDispatcher, HookRegistry, HookStage, split_list};
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;
use velcro_config::Settings;
use velcro_core::{Error, Result};

/// A task body
pub type TaskFn = Rc<dyn Fn(&Settings, &TaskCall) -> Result<()>>;

/// Arguments of one task invocation
///
/// The `pre` and `post` keyword arguments are hook lists. They are held
/// apart from the other keyword arguments and never reach the task body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCall {
    /// Positional arguments
    pub args: Vec<String>,
    /// Keyword arguments other than `pre`/`post`
    pub kwargs: IndexMap<String, String>,
    pre: Option<String>,
    post: Option<String>,
}

impl TaskCall {
    /// Create an empty call
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a positional argument
    #[must_use]
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Add a keyword argument; `pre` and `post` become hook lists
    #[must_use]
    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match key.as_str() {
            "pre" => self.pre = Some(value),
            "post" => self.post = Some(value),
            _ => {
                self.kwargs.insert(key, value);
            }
        }
        self
    }

    /// Set the call-time pre-hook list
    #[must_use]
    pub fn pre(self, list: impl Into<String>) -> Self {
        self.kwarg(HookStage::Pre.name(), list)
    }

    /// Set the call-time post-hook list
    #[must_use]
    pub fn post(self, list: impl Into<String>) -> Self {
        self.kwarg(HookStage::Post.name(), list)
    }

    /// Call-time hooks for a stage, in list order
    pub fn hooks(&self, stage: HookStage) -> Vec<String> {
        let list = match stage {
            HookStage::Pre => self.pre.as_deref(),
            HookStage::Post => self.post.as_deref(),
        };
        list.map(split_list).unwrap_or_default()
    }
}

/// Hooks that ran around one task invocation
#[derive(Debug, Default)]
pub struct TaskReport {
    /// Pre-hook dispatch
    pub pre: DispatchReport,
    /// Post-hook dispatch
    pub post: DispatchReport,
}

impl TaskReport {
    /// Every reported hook failure, pre then post
    pub fn failures(&self) -> impl Iterator<Item = &Error> {
        self.pre.failures.iter().chain(self.post.failures.iter())
    }

    /// Check if no hook failure was reported
    pub fn is_clean(&self) -> bool {
        self.pre.is_clean() && self.post.is_clean()
    }
}

/// A task body plus its fixed hooks
#[derive(Clone)]
pub struct HookedTask {
    name: String,
    description: Option<String>,
    pre_hooks: Vec<String>,
    post_hooks: Vec<String>,
    policy: FailurePolicy,
    body: TaskFn,
}

impl fmt::Debug for HookedTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookedTask")
            .field("name", &self.name)
            .field("pre_hooks", &self.pre_hooks)
            .field("post_hooks", &self.post_hooks)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl HookedTask {
    /// Wrap a task body
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Settings, &TaskCall) -> Result<()> + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            pre_hooks: Vec::new(),
            post_hooks: Vec::new(),
            policy: FailurePolicy::default(),
            body: Rc::new(body),
        }
    }

    /// Hooks that always run before the body
    #[must_use]
    pub fn with_pre_hooks<I, S>(mut self, hooks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pre_hooks = hooks.into_iter().map(Into::into).collect();
        self
    }

    /// Hooks that always run after the body
    #[must_use]
    pub fn with_post_hooks<I, S>(mut self, hooks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.post_hooks = hooks.into_iter().map(Into::into).collect();
        self
    }

    /// Set the failure policy
    #[must_use]
    pub fn policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set a one-line description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Task name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-line description, if any
    pub fn about(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Fixed pre-hooks
    pub fn pre_hooks(&self) -> &[String] {
        &self.pre_hooks
    }

    /// Fixed post-hooks
    pub fn post_hooks(&self) -> &[String] {
        &self.post_hooks
    }

    /// Failure policy
    pub fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Run hooks and body
    ///
    /// A body error is always returned. Under best-effort the post-hooks
    /// still run before it is.
    pub fn run(&self, settings: &Settings, registry: &HookRegistry, call: &TaskCall) -> Result<TaskReport> {
        self.run_with_policy(settings, registry, call, self.policy)
    }

    /// Run with an explicit failure policy instead of the task's own
    pub fn run_with_policy(
        &self,
        settings: &Settings,
        registry: &HookRegistry,
        call: &TaskCall,
        policy: FailurePolicy,
    ) -> Result<TaskReport> {
        let dispatcher = HookDispatcher::new(registry).policy(policy);
        let mut report = TaskReport::default();

        tracing::debug!(task = %self.name, ?policy, "Running task");

        let pre: Vec<String> = self
            .pre_hooks
            .iter()
            .cloned()
            .chain(call.hooks(HookStage::Pre))
            .collect();
        report.pre = dispatcher.dispatch(settings, &pre)?;

        let outcome = (self.body)(settings, call);

        if outcome.is_err() && policy == FailurePolicy::FailFast {
            tracing::debug!(task = %self.name, "Task body failed, skipping post-hooks");
            return outcome.map(|()| report);
        }

        let post: Vec<String> = call
            .hooks(HookStage::Post)
            .into_iter()
            .chain(self.post_hooks.iter().cloned())
            .collect();
        report.post = dispatcher.dispatch(settings, &post)?;

        outcome.map(|()| report)
    }
}

/// Task name → task table
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: IndexMap<String, HookedTask>,
}

impl TaskRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task, replacing one with the same name
    pub fn register(&mut self, task: HookedTask) {
        tracing::debug!(task = %task.name, "Registering task");
        self.tasks.insert(task.name.clone(), task);
    }

    /// Look up a task
    pub fn get(&self, name: &str) -> Option<&HookedTask> {
        self.tasks.get(name)
    }

    /// Look up a task or fail with [`Error::UnknownTask`]
    pub fn require(&self, name: &str) -> Result<&HookedTask> {
        self.get(name)
            .ok_or_else(|| Error::UnknownTask(name.to_string()))
    }

    /// Registered tasks in registration order
    pub fn iter(&self) -> impl Iterator<Item = &HookedTask> {
        self.tasks.values()
    }

    /// Number of registered tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if no task is registered
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
