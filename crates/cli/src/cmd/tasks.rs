//! Tasks command implementation

use clap::Args;
use owo_colors::OwoColorize;
use velcro_engine::Engine;

use crate::command::Command;
use crate::error::Result;

/// Tasks command arguments
#[derive(Debug, Args)]
pub struct TasksCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

impl Command for TasksCommand {
    type Output = ();

    fn execute(&self, engine: &Engine) -> Result<()> {
        let tasks = engine.tasks();

        if self.json {
            let list: Vec<_> = tasks
                .iter()
                .map(|task| {
                    serde_json::json!({
                        "name": task.name(),
                        "description": task.about(),
                        "pre": task.pre_hooks(),
                        "post": task.post_hooks(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&list)?);
            return Ok(());
        }

        println!("{} ({} registered)", "Tasks:".bold(), tasks.len());
        for task in tasks.iter() {
            match task.about() {
                Some(about) => println!("  • {} {}", task.name().green(), about.dimmed()),
                None => println!("  • {}", task.name().green()),
            }
        }
        Ok(())
    }
}
