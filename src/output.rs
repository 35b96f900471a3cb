//! Colored output and progress reporting for recipe evaluation
//!
//! Uses owo-colors for terminal colors and indicatif for spinners.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

/// Print an action header (blue, bold)
/// Example: "==> Creating log4cxx/0.13.0"
pub fn action(message: &str) {
    println!("{} {}", "==>".blue().bold(), message.bold());
}

/// Print a lifecycle stage (cyan arrow) to stderr
/// Example: "  -> config_options"
pub fn stage(name: &str) {
    eprintln!("  {} {}", "->".cyan(), name);
}

/// Print a detail line (dimmed)
/// Example: "     downloading https://..."
pub fn detail(message: &str) {
    println!("     {}", message.dimmed());
}

/// Print a success message (green)
pub fn success(message: &str) {
    println!("{} {}", "==>".green().bold(), message.green());
}

/// Print an info message (cyan)
pub fn info(message: &str) {
    println!("{} {}", "::".cyan(), message);
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}

/// Print a skip message (dimmed)
/// Example: "==> cross-building, skipping test"
pub fn skip(message: &str) {
    println!("{} {}", "==>".dimmed(), message.dimmed());
}

/// Echo an external command before it runs.
pub fn command(dry_run: bool, cmd: &str) {
    let tag = if dry_run { "[dry-run]" } else { "[exec]" };
    eprintln!("     {} {}", tag.dimmed(), cmd);
}

/// Create a download progress bar
pub fn download_progress(total_size: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_size);
    let style = ProgressStyle::default_bar()
        .template("     {spinner:.cyan} [{bar:30.cyan/dim}] {bytes}/{total_bytes} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸━");
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a spinner for long running toolchain steps
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("     {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Finish a progress bar and clear it
pub fn progress_done(pb: ProgressBar) {
    pb.finish_and_clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_creation() {
        let pb = download_progress(1000);
        progress_done(pb);
    }

    #[test]
    fn test_spinner_creation() {
        let pb = spinner("Building");
        progress_done(pb);
    }
}
