//! Terminal prompts for settings that ask the operator

use dialoguer::{Input, Password, theme::ColorfulTheme};
use velcro_config::Prompter;
use velcro_core::{Error, Result};

/// Prompter backed by `dialoguer`
#[derive(Debug, Clone, Copy, Default)]
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn ask(&self, question: &str, secret: bool) -> Result<String> {
        tracing::debug!(secret, "Prompting operator");
        let theme = ColorfulTheme::default();
        let answer = if secret {
            Password::with_theme(&theme)
                .with_prompt(question)
                .allow_empty_password(true)
                .interact()
        } else {
            Input::<String>::with_theme(&theme)
                .with_prompt(question)
                .interact_text()
        };
        answer.map_err(|e| Error::Message(format!("Prompt failed: {e}")))
    }
}
