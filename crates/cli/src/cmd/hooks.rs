//! Hooks command implementation
//!
//! List the hook references that can be named in `--pre`/`--post`.

use clap::Args;
use owo_colors::OwoColorize;
use velcro_engine::Engine;

use crate::command::Command;
use crate::error::Result;

/// Hooks command arguments
#[derive(Debug, Args)]
pub struct HooksCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

impl Command for HooksCommand {
    type Output = ();

    fn execute(&self, engine: &Engine) -> Result<()> {
        let references = engine.hooks().references();

        if self.json {
            let hooks: Vec<_> = references
                .iter()
                .map(|(reference, callable)| {
                    serde_json::json!({ "reference": reference, "callable": callable })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&hooks)?);
            return Ok(());
        }

        println!("{} ({} registered)", "Hooks:".bold(), references.len());
        for (reference, callable) in &references {
            if *callable {
                println!("  • {}", reference.green());
            } else {
                println!("  • {} {}", reference.dimmed(), "[not callable]".dimmed());
            }
        }
        Ok(())
    }
}
