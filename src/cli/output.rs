//! CLI output formatting utilities.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a transcript entry.
    pub fn transcript_info(title: &str, id: &str, line_count: usize, saved_at: &str) {
        println!(
            "  {} {} ({}, {} lines, saved {})",
            style("*").cyan(),
            style(title).bold(),
            style(id).dim(),
            line_count,
            saved_at
        );
    }

    /// Print one cited sentence with its resolved source spans.
    pub fn cited_segment(text: &str, spans: &[(usize, usize)]) {
        if spans.is_empty() {
            println!("{}", text);
        } else {
            let refs: Vec<String> = spans
                .iter()
                .map(|(start, end)| format!("{}..{}", start, end))
                .collect();
            println!("{} {}", text, style(format!("[{}]", refs.join(", "))).dim());
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}
