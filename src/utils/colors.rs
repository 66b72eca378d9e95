// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Terminal output helpers shared by the CLI commands

use colored::Colorize;

/// Print a bold title with an underline
pub fn print_header(title: &str) {
    println!("{}", title.bold());
    println!("{}", "═".repeat(title.chars().count().max(40)));
}

/// Print a section label
pub fn print_section(title: &str) {
    println!();
    println!("{}:", title.bold());
}

pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    println!("  {} {}", "✗".red(), msg);
}

pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

pub fn print_info(msg: &str) {
    println!("  {} {}", "→".blue(), msg);
}

/// Render column names for display, or a dimmed marker when empty
pub fn column_list<'c>(columns: impl IntoIterator<Item = &'c String>) -> String {
    let joined = columns
        .into_iter()
        .map(|c| c.cyan().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        joined
    }
}
