//! Run command implementation
//!
//! Runs a registered task. Arguments after the task name are passed to the
//! body; `key=value` arguments become keyword arguments, so
//! `velcro run deploy pre=a.b` is the same as `--pre a.b`.

use clap::Args;
use owo_colors::OwoColorize;
use velcro_engine::{Engine, FailurePolicy, TaskCall, TaskReport};

use crate::command::Command;
use crate::error::Result;

/// Run command arguments
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Task to run
    #[arg(required = true)]
    pub task: String,

    /// Task arguments; `key=value` pairs are passed as keyword arguments
    #[arg(value_name = "ARG")]
    pub args: Vec<String>,

    /// Hooks to run before the task, separated by `|`
    #[arg(long, value_name = "HOOKS")]
    pub pre: Option<String>,

    /// Hooks to run after the task, separated by `|`
    #[arg(long, value_name = "HOOKS")]
    pub post: Option<String>,

    /// Keep going when a hook fails and run post-hooks even if the task fails
    #[arg(long)]
    pub best_effort: bool,
}

impl RunCommand {
    /// Build the task invocation from the command line
    pub fn call(&self) -> TaskCall {
        let mut call = TaskCall::new();
        for arg in &self.args {
            call = match arg.split_once('=') {
                Some((key, value)) if !key.is_empty() => call.kwarg(key, value),
                _ => call.arg(arg.as_str()),
            };
        }
        if let Some(pre) = &self.pre {
            call = call.pre(pre.as_str());
        }
        if let Some(post) = &self.post {
            call = call.post(post.as_str());
        }
        call
    }
}

impl Command for RunCommand {
    type Output = Option<TaskReport>;

    fn execute(&self, engine: &Engine) -> Result<Option<TaskReport>> {
        let call = self.call();
        let report = if self.best_effort {
            engine.run_task_with_policy(&self.task, &call, FailurePolicy::BestEffort)?
        } else {
            engine.run_task(&self.task, &call)?
        };

        if let Some(report) = &report {
            let failures = report.failures().count();
            if failures > 0 {
                println!(
                    "{}: {} finished with {} hook failure(s)",
                    "Warning".yellow(),
                    self.task,
                    failures
                );
            }
        }
        Ok(report)
    }
}
