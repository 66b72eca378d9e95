// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Invocation graph rendering

use super::{ExportGraph, GraphBuilder};

fn distinct<'b>(builder: &'b GraphBuilder<'_>) -> impl Iterator<Item = usize> + 'b {
    (0..builder.records().len()).filter(move |&i| builder.canonical(i) == i)
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Numbered export order of the included steps with their dependencies
pub fn to_text(builder: &GraphBuilder<'_>, graph: &ExportGraph<'_>) -> String {
    let mut out = String::new();

    for (i, (idx, record, _)) in graph.steps().enumerate() {
        let deps: Vec<String> = builder
            .dependencies(idx)
            .into_iter()
            .map(|d| format!("#{}", d))
            .collect();

        out.push_str(&format!("{}. #{} {}", i + 1, idx, record.component_id()));
        if !deps.is_empty() {
            out.push_str(&format!(" [depends: {}]", deps.join(", ")));
        }
        if idx == graph.terminal() {
            out.push_str(" (terminal)");
        }
        out.push('\n');
    }

    let pruned: Vec<String> = distinct(builder)
        .filter(|&i| !graph.contains(i))
        .map(|i| format!("#{}", i))
        .collect();
    if !pruned.is_empty() {
        out.push_str(&format!("pruned: {}\n", pruned.join(", ")));
    }

    out
}

/// DOT digraph of every invocation, included steps filled
pub fn to_dot(builder: &GraphBuilder<'_>, graph: &ExportGraph<'_>) -> String {
    let mut out = String::from("digraph export {\n");
    out.push_str("    rankdir=TB;\n");
    out.push_str("    node [shape=box, style=rounded];\n\n");

    for idx in distinct(builder) {
        let record = &builder.records()[idx];
        let style = if graph.contains(idx) {
            ", style=\"rounded,filled\", fillcolor=palegreen"
        } else {
            ", color=gray, fontcolor=gray"
        };
        out.push_str(&format!(
            "    s{} [label=\"#{} {}\"{}];\n",
            idx,
            idx,
            escape(&record.component_id()),
            style
        ));
    }

    out.push('\n');
    for (from, to, key) in builder.edges() {
        out.push_str(&format!(
            "    s{} -> s{} [label=\"{}\"];\n",
            from,
            to,
            escape(&key.to_string())
        ));
    }

    out.push_str("}\n");
    out
}

/// Mermaid flowchart of every invocation, included steps highlighted
pub fn to_mermaid(builder: &GraphBuilder<'_>, graph: &ExportGraph<'_>) -> String {
    let mut out = String::from("graph TD\n");

    for idx in distinct(builder) {
        let record = &builder.records()[idx];
        out.push_str(&format!(
            "    s{}[\"#{} {}\"]",
            idx,
            idx,
            record.component_id().replace('"', "'")
        ));
        if graph.contains(idx) {
            out.push_str(":::included");
        }
        out.push('\n');
    }

    for (from, to, _) in builder.edges() {
        out.push_str(&format!("    s{} --> s{}\n", from, to));
    }

    out.push_str("    classDef included fill:#d4f7d4,stroke:#2e7d32\n");
    out
}
