// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! pipexport - per-party model export
//!
//! Packages the invocation chain behind a trained model into an archive.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pipexport::cli::export::ExportArgs;
use pipexport::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "pipexport=debug"
    } else {
        "pipexport=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    match cli.command {
        Commands::Export {
            request,
            config,
            party,
            storage_root,
            output,
            report,
            terminal,
            no_verify,
            format,
        } => {
            let args = ExportArgs {
                request,
                config,
                party,
                storage_root,
                output,
                report,
                terminal,
                no_verify,
                format,
            };
            pipexport::cli::export::run(args, cli.verbose).await
        }
        Commands::Verify { archive, expect } => {
            pipexport::cli::verify::run(archive, expect, cli.verbose).await
        }
        Commands::Graph {
            request,
            terminal,
            format,
        } => pipexport::cli::graph::run(request, terminal, format, cli.verbose).await,
        Commands::Validate { request } => pipexport::cli::validate::run(request, cli.verbose).await,
    }
}
