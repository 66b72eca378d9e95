// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Progress spinner for long-running exports

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const EXPORT_TICKS: &[&str] = &["[    ]", "[=   ]", "[==  ]", "[=== ]", "[ ===]", "[  ==]", "[   =]", "[====]"];

/// Spinner shown while an export phase runs, with elapsed time
pub fn create_spinner(phase: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}")
        .expect("Invalid spinner template")
        .tick_strings(EXPORT_TICKS);

    let pb = ProgressBar::new_spinner().with_style(style).with_message(phase.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Stop a spinner, leaving a ✓ or ✗ line behind
pub fn finish_spinner(pb: &ProgressBar, ok: bool, message: &str) {
    let mark = if ok { "✓".green() } else { "✗".red() };
    pb.set_style(ProgressStyle::default_spinner().template("{msg}").expect("Invalid spinner template"));
    pb.finish_with_message(format!("{} {}", mark, message));
}
