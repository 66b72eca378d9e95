// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Error types for the export pipeline
//!
//! Every failure names the offending invocation index, dataset key or
//! attribute path so an operator can locate it in the request document.

mod mismatch;

pub use mismatch::Mismatch;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Main error type for pipexport
#[derive(Error, Debug, Diagnostic)]
pub enum ExportError {
    // ─────────────────────────────────────────────────────────────────────────
    // Request Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Export request contains no invocations")]
    #[diagnostic(
        code(pipexport::empty_request),
        help("List every invocation that may have contributed to the exported step")
    )]
    EmptyRequest,

    #[error("Got {records} invocation records but {results} results")]
    #[diagnostic(
        code(pipexport::record_result_mismatch),
        help("Every invocation record must be paired with exactly one result")
    )]
    RecordResultMismatch { records: usize, results: usize },

    #[error("Terminal invocation index {index} is out of range ({len} invocations)")]
    #[diagnostic(code(pipexport::invalid_terminal))]
    InvalidTerminal { index: usize, len: usize },

    #[error("Invalid export request: {reason}")]
    #[diagnostic(code(pipexport::invalid_request))]
    InvalidRequest {
        reason: String,
        #[help]
        help: Option<String>,
    },

    #[error("Dataset '{dataset}' has an invalid schema: {reason}")]
    #[diagnostic(code(pipexport::invalid_schema))]
    InvalidSchema { dataset: String, reason: String },

    #[error("Attribute holds a {found} value, expected {expected}")]
    #[diagnostic(code(pipexport::attribute_type))]
    AttributeType {
        expected: &'static str,
        found: &'static str,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Lineage Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Dataset {key} is produced by both invocation {first} and invocation {second}")]
    #[diagnostic(
        code(pipexport::ambiguous_lineage),
        help("The invocation list is inconsistent: each output dataset must have one producer")
    )]
    AmbiguousLineage {
        key: String,
        first: usize,
        second: usize,
    },

    #[error("Invocation {invocation} needs dataset '{dataset}' which no invocation produces")]
    #[diagnostic(
        code(pipexport::unresolved_dependency),
        help("Placeholder datasets must be produced by an invocation in the request; raw inputs need data_refs")
    )]
    UnresolvedDependency { invocation: usize, dataset: String },

    #[error("Invocations form a cycle: {}", format_indices(.invocations))]
    #[diagnostic(
        code(pipexport::cyclic_lineage),
        help("A component can never consume its own output or a descendant's output")
    )]
    CyclicLineage { invocations: Vec<usize> },

    #[error("Invocation {invocation} has a malformed attribute path '{path}': {reason}")]
    #[diagnostic(code(pipexport::malformed_attribute_path))]
    MalformedAttributePath {
        invocation: usize,
        path: String,
        reason: String,
    },

    #[error("Invocation {invocation} attribute '{path}' holds {value}, which cannot be exported")]
    #[diagnostic(
        code(pipexport::non_finite_attribute),
        help("Float parameters written to the manifest must be finite")
    )]
    NonFiniteAttribute {
        invocation: usize,
        path: String,
        value: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Bundle Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Payload '{uri}' for party '{party}' could not be read: {error}")]
    #[diagnostic(code(pipexport::payload_unavailable))]
    PayloadUnavailable {
        uri: String,
        party: String,
        error: String,
    },

    #[error("Failed to write archive '{path}': {error}")]
    #[diagnostic(code(pipexport::archive_write_failure))]
    ArchiveWriteFailure { path: PathBuf, error: String },

    #[error("Failed to read archive '{path}': {error}")]
    #[diagnostic(code(pipexport::archive_read_error))]
    ArchiveReadError { path: PathBuf, error: String },

    #[error("Export verification failed: {mismatch}")]
    #[diagnostic(
        code(pipexport::verification_mismatch),
        help("The artifact was published but must be treated as invalid")
    )]
    VerificationMismatch { mismatch: Mismatch },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("File not found: {path}")]
    #[diagnostic(code(pipexport::file_not_found))]
    FileNotFound {
        path: PathBuf,
        #[help]
        help: Option<String>,
    },

    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(pipexport::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(pipexport::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    #[error("Unsupported config format: {path}")]
    #[diagnostic(
        code(pipexport::config_format),
        help("Supported formats: YAML (.yaml/.yml), TOML (.toml), JSON (.json)")
    )]
    ConfigFormat { path: PathBuf },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/Parse Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(pipexport::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(pipexport::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(pipexport::json_error))]
    Json { message: String },

    #[error("TOML parsing error: {message}")]
    #[diagnostic(code(pipexport::toml_error))]
    Toml { message: String },
}

fn format_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|i| format!("#{}", i))
        .collect::<Vec<_>>()
        .join(" → ")
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for ExportError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<toml::de::Error> for ExportError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml { message: e.to_string() }
    }
}

impl ExportError {
    /// Create a malformed path error for an included invocation
    pub fn malformed_path(invocation: usize, path: &str, reason: impl Into<String>) -> Self {
        Self::MalformedAttributePath {
            invocation,
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Wrap a verification mismatch
    pub fn mismatch(mismatch: Mismatch) -> Self {
        Self::VerificationMismatch { mismatch }
    }

    /// Whether this error reports a lineage inconsistency in the request
    pub fn is_lineage_error(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousLineage { .. }
                | Self::UnresolvedDependency { .. }
                | Self::CyclicLineage { .. }
                | Self::MalformedAttributePath { .. }
        )
    }
}
