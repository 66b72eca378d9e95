// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Graph command - visualize the invocation graph

use miette::Result;
use std::path::PathBuf;

use super::{load_request, GraphFormat};
use crate::graph::{render, GraphBuilder};

/// Run the graph command
pub async fn run(
    request_path: PathBuf,
    terminal: Option<usize>,
    format: GraphFormat,
    _verbose: bool,
) -> Result<()> {
    let mut request = load_request(&request_path).await?;
    if terminal.is_some() {
        request.terminal = terminal;
    }

    let terminal = request.terminal_index()?;
    let (records, results) = request.split();
    let builder = GraphBuilder::build(&records, &results)?;
    let graph = builder.prune(terminal)?;

    let output = match format {
        GraphFormat::Text => render::to_text(&builder, &graph),
        GraphFormat::Dot => render::to_dot(&builder, &graph),
        GraphFormat::Mermaid => render::to_mermaid(&builder, &graph),
    };

    print!("{}", output);

    Ok(())
}
