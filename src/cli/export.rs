// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Export command - publish one party's artifact

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::{load_request, OutputFormat};
use crate::config::ExportConfig;
use crate::exporter::{ExportOptions, Exporter};
use crate::storage::FilesystemStore;
use crate::utils::{create_spinner, finish_spinner, print_info};

/// Command-line settings of the export command
#[derive(Debug, Clone)]
pub struct ExportArgs {
    pub request: PathBuf,
    pub config: Option<PathBuf>,
    pub party: Option<String>,
    pub storage_root: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub terminal: Option<usize>,
    pub no_verify: bool,
    pub format: OutputFormat,
}

/// Run the export command
pub async fn run(args: ExportArgs, verbose: bool) -> Result<()> {
    let config = match &args.config {
        Some(path) => ExportConfig::load(path)?,
        None => ExportConfig::default(),
    };

    let mut request = load_request(&args.request).await?;
    if args.terminal.is_some() {
        request.terminal = args.terminal;
    }

    let party = args.party.or(config.party.clone()).ok_or_else(|| {
        miette::miette!(
            "No exporting party given\n\n\
             Pass --party, set PIPEXPORT_PARTY, or add 'party' to the config file."
        )
    })?;
    let storage_root = args
        .storage_root
        .or(config.storage_root.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let output = args
        .output
        .or(config.output.clone())
        .unwrap_or_else(|| PathBuf::from(format!("{}.{}.tar.gz", request.model_name, party)));

    let mut options = ExportOptions::new(party.clone(), output).with_config(&config);
    if let Some(report) = args.report {
        options = options.with_report(report);
    }
    if args.no_verify {
        options = options.without_verify();
    }

    if verbose {
        print_info(&format!("{} {}", "Storage root:".dimmed(), storage_root.display()));
    }

    let spinner = create_spinner(&format!("Exporting '{}' for {}", request.model_name, party));
    let exporter = Exporter::new(FilesystemStore::new(storage_root));
    let task_options = options.clone();
    let outcome = tokio::task::spawn_blocking(move || exporter.export(&request, &task_options))
        .await
        .map_err(|e| miette::miette!("Export task failed: {}", e))?;

    let report = match outcome {
        Ok(report) => {
            finish_spinner(&spinner, true, &format!("Published {}", options.output.display()));
            report
        }
        Err(e) => {
            finish_spinner(&spinner, false, "Export failed");
            return Err(e.into());
        }
    };

    match args.format {
        OutputFormat::Text => {
            println!();
            print!("{}", report.to_text());
        }
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}
