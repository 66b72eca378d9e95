// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Export orchestration
//!
//! Runs one party's export: build the invocation graph, prune it to the
//! terminal step, resolve column lineage, serialize and publish the
//! archive, then verify what was published.

mod report;

pub use report::ExportReport;

use std::path::PathBuf;
use tracing::{info, warn};

use crate::bundle::{digest, digest_parts, BundleSerializer, ExportVerifier, DEFAULT_COMPRESSION};
use crate::config::ExportConfig;
use crate::errors::ExportResult;
use crate::graph::GraphBuilder;
use crate::lineage::LineageResolver;
use crate::model::ExportRequest;
use crate::storage::PayloadSource;

/// Per-call export options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Exporting party
    pub party: String,
    /// Archive destination
    pub output: PathBuf,
    /// Optional JSON report destination
    pub report: Option<PathBuf>,
    /// Verify the archive after publishing
    pub verify: bool,
    /// Gzip level
    pub compression: u32,
}

impl ExportOptions {
    pub fn new(party: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            party: party.into(),
            output: output.into(),
            report: None,
            verify: true,
            compression: DEFAULT_COMPRESSION,
        }
    }

    /// Take report, verification and compression settings from a config
    pub fn with_config(mut self, config: &ExportConfig) -> Self {
        self.report = config.report.clone();
        self.verify = config.verify;
        self.compression = config.compression();
        self
    }

    pub fn with_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.report = Some(path.into());
        self
    }

    pub fn without_verify(mut self) -> Self {
        self.verify = false;
        self
    }
}

/// Exporter over one party's payload storage.
///
/// Holds no per-call state; independent exports may share one exporter
/// across threads.
pub struct Exporter<S: PayloadSource> {
    source: S,
}

impl<S: PayloadSource> Exporter<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Export the request's terminal invocation
    pub fn export(&self, request: &ExportRequest, options: &ExportOptions) -> ExportResult<ExportReport> {
        let terminal = request.terminal_index()?;
        let (records, results) = request.split();

        info!(
            model = %request.model_name,
            party = %options.party,
            invocations = records.len(),
            terminal,
            "starting export"
        );

        let builder = GraphBuilder::build(&records, &results)?;
        let graph = builder.prune(terminal)?;
        let lineage = LineageResolver::resolve(&graph)?;

        let serializer = BundleSerializer::new(&self.source).with_compression(options.compression);
        let artifact = serializer.serialize(
            &graph,
            &lineage,
            &request.model_name,
            &request.model_desc,
            &options.party,
        )?;
        serializer.publish(&artifact, &options.output)?;

        let verification = if options.verify {
            Some(ExportVerifier::verify(&options.output, &lineage.used_columns))
        } else {
            None
        };

        let used_columns: Vec<String> = lineage.used_columns.iter().cloned().collect();
        let report = ExportReport {
            model_name: request.model_name.clone(),
            party: options.party.clone(),
            terminal,
            steps: artifact.manifest().component_ids(),
            desc: used_columns.join(","),
            used_columns,
            archive: options.output.clone(),
            manifest_digest: digest(artifact.manifest_bytes()),
            model_file_digest: digest(artifact.model_file_bytes()),
            bundle_digest: digest_parts(artifact.entries()),
            verified: verification.as_ref().map(|v| v.is_ok()),
        };

        if let Some(path) = &options.report {
            report.write(path)?;
        }

        if let Some(Err(e)) = verification {
            warn!(archive = %options.output.display(), "published artifact failed verification");
            return Err(e);
        }

        info!(
            party = %options.party,
            steps = report.steps.len(),
            used_columns = %report.desc,
            "export complete"
        );

        Ok(report)
    }
}
