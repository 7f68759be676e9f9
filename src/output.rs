//! Colored console output for the proposal scripts.
//!
//! The printed log is the deliverable of a simulation run: the operator
//! reads it to judge whether a proposal does what it should. Symbols match
//! the historical scripts so old and new logs diff cleanly.

use colored::Colorize;

/// Task banner: name plus the on-chain proposal description.
pub fn task_header(name: &str, description: &str) {
    println!();
    println!("{}", format!("=== {name} ===").blue().bold());
    println!("  {}", description.cyan());
}

/// A section of a task (parameter gathering, effect checks, ...).
pub fn section(title: &str) {
    println!();
    println!("{}", title.blue().bold());
}

/// A parameter or decision worth having in the audit trail.
pub fn param(message: &str) {
    println!("📄 {message}");
}

/// Free-form progress line.
pub fn info(message: &str) {
    println!("{message}");
}

/// A labelled value, dimmed label and cyan value.
pub fn kv(label: &str, value: &str) {
    println!("  {} {}", format!("{label}:").dimmed(), value.cyan());
}

/// A passed post-condition check.
pub fn check_ok(message: &str) {
    println!("{} {}", "✅ Correct".green(), message);
}

/// A failed post-condition check. Logged, never thrown.
pub fn check_fail(message: &str) {
    println!("{} {}", "🚨 Incorrect".red().bold(), message);
}

/// A non-fatal error in a best-effort nested task.
pub fn error(message: &str) {
    println!("{} {}", "🚨🚨 ERROR!!!".red().bold(), message);
}

/// Gas spent by a transaction.
pub fn gas(label: &str, gas_used: u64) {
    println!("⛽ {label} GAS SPENT: {}", gas_used.to_string().cyan());
}
