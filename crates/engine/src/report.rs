//! Operator-facing output
//!
//! Every reported problem is a single `[ERROR]: ...` line. Output also goes
//! through `tracing` so a log file sees the same events.

use owo_colors::OwoColorize;
use velcro_core::Error;

/// Format an error as the single line shown to the operator
pub fn error_line(message: &str) -> String {
    format!("[ERROR]: {message}")
}

/// Report an error without aborting
pub fn error(err: &Error) {
    message(&err.to_string());
}

/// Report an error message without aborting
pub fn message(message: &str) {
    tracing::debug!(error = %message, "reported");
    eprintln!("{}", error_line(message).red().bold());
}

/// Announce a hook about to run
pub fn hook(reference: &str) {
    tracing::debug!(hook = %reference, "invoking hook");
    println!("{}", format!("[HOOK]: {reference}").yellow());
}

/// Print a labelled value
pub fn labelled(label: &str, value: &str) {
    println!("{} {}", format!("{label}:").blue(), value.green());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_line() {
        assert_eq!(error_line("Missing Target"), "[ERROR]: Missing Target");
    }
}
