// ABOUTME: Shared terminal output helpers for the defects CLI
// ABOUTME: Table styling, colored status and priority labels, and text truncation

use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};

use defects_core::{DefectStatus, Priority};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Placeholder for empty cells
pub const EMPTY: &str = "—";

pub fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

pub fn status_colored(status: DefectStatus) -> ColoredString {
    match status {
        DefectStatus::Open => status.as_str().blue(),
        DefectStatus::Reviewed => status.as_str().magenta(),
        DefectStatus::Ongoing => status.as_str().yellow(),
        DefectStatus::Done => status.as_str().cyan(),
        DefectStatus::Completed => status.as_str().green(),
    }
}

pub fn priority_colored(priority: Priority) -> ColoredString {
    match priority {
        Priority::High => "High".red(),
        Priority::Medium => "Medium".yellow(),
        Priority::Low => "Low".green(),
    }
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn or_empty(value: Option<&str>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(EMPTY)
        .to_string()
}

pub fn success(message: impl std::fmt::Display) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn cancelled() {
    println!("{}", "✗ Operation cancelled".yellow());
}
