// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for pipexport.

pub mod export;
pub mod graph;
pub mod validate;
pub mod verify;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::model::ExportRequest;

/// Per-party model export
///
/// Package the minimal chain of logged invocations behind a trained model
/// into a self-contained archive.
#[derive(Parser, Debug)]
#[clap(
    name = "pipexport",
    version,
    about = "Export the invocation chain behind a trained model as a per-party archive",
    long_about = None,
    after_help = "Examples:\n\
        pipexport validate request.json                    Check a request\n\
        pipexport graph request.json --format dot          Show the invocation graph\n\
        pipexport export request.json --party alice        Export alice's artifact\n\
        pipexport verify alice.tar.gz --expect a0,a1,b0    Re-check a published artifact\n\n\
        See 'pipexport <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export one party's artifact
    Export {
        /// Export request (YAML or JSON)
        request: PathBuf,

        /// Export configuration (YAML, TOML or JSON)
        #[clap(short, long)]
        config: Option<PathBuf>,

        /// Exporting party
        #[clap(short, long, env = "PIPEXPORT_PARTY")]
        party: Option<String>,

        /// Directory dataset uris are relative to
        #[clap(long, env = "PIPEXPORT_STORAGE_ROOT")]
        storage_root: Option<PathBuf>,

        /// Archive destination
        #[clap(short, long)]
        output: Option<PathBuf>,

        /// Write a JSON report here
        #[clap(long)]
        report: Option<PathBuf>,

        /// Export this invocation instead of the request's terminal
        #[clap(short, long)]
        terminal: Option<usize>,

        /// Skip post-export verification
        #[clap(long)]
        no_verify: bool,

        /// Output format of the printed report
        #[clap(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Verify a published artifact
    Verify {
        /// Archive to verify
        archive: PathBuf,

        /// Expected used columns, comma separated (`--expect=` for none)
        #[clap(short, long, value_delimiter = ',', num_args = 0.., required = true)]
        expect: Vec<String>,
    },

    /// Show the invocation graph and what export keeps
    Graph {
        /// Export request (YAML or JSON)
        request: PathBuf,

        /// Terminal invocation (defaults to the request's)
        #[clap(short, long)]
        terminal: Option<usize>,

        /// Output format
        #[clap(short, long, default_value = "text")]
        format: GraphFormat,
    },

    /// Validate an export request
    Validate {
        /// Export request (YAML or JSON)
        request: PathBuf,
    },
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
}

impl std::str::FromStr for GraphFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "dot" => Ok(Self::Dot),
            "mermaid" => Ok(Self::Mermaid),
            _ => Err(format!("Unknown graph format: {}", s)),
        }
    }
}

/// Read and parse a request file
pub(crate) async fn load_request(path: &Path) -> miette::Result<ExportRequest> {
    if !path.exists() {
        return Err(miette::miette!("Request file not found: {}", path.display()));
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| miette::miette!("Failed to read '{}': {}", path.display(), e))?;

    Ok(ExportRequest::parse(&content, path)?)
}
