// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Export request documents
//!
//! A request lists every invocation that might have contributed to the
//! exported step, in execution order, each paired with its result.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{InvocationRecord, InvocationResult};
use crate::errors::{ExportError, ExportResult};

/// An invocation record together with the result it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedInvocation {
    pub record: InvocationRecord,
    #[serde(default)]
    pub result: InvocationResult,
}

/// Export request loaded from YAML or JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Name recorded in the manifest
    pub model_name: String,

    /// Free-form description recorded in the manifest
    #[serde(default)]
    pub model_desc: String,

    /// Invocations in execution order
    pub invocations: Vec<LoggedInvocation>,

    /// Index of the exported step; defaults to the last invocation
    #[serde(default)]
    pub terminal: Option<usize>,
}

impl ExportRequest {
    /// Create a request from parallel record and result lists
    pub fn new(
        model_name: impl Into<String>,
        records: Vec<InvocationRecord>,
        results: Vec<InvocationResult>,
    ) -> ExportResult<Self> {
        if records.len() != results.len() {
            return Err(ExportError::RecordResultMismatch {
                records: records.len(),
                results: results.len(),
            });
        }

        Ok(Self {
            model_name: model_name.into(),
            model_desc: String::new(),
            invocations: records
                .into_iter()
                .zip(results)
                .map(|(record, result)| LoggedInvocation { record, result })
                .collect(),
            terminal: None,
        })
    }

    /// Set the description
    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.model_desc = desc.into();
        self
    }

    /// Load a request file; `.json` is parsed as JSON, anything else as YAML
    pub fn from_file(path: &Path) -> ExportResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ExportError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content, path)
    }

    /// Parse request text read from `path`
    pub fn parse(content: &str, path: &Path) -> ExportResult<Self> {
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            Self::from_json(content)
        } else {
            Self::from_yaml(content)
        }
    }

    pub fn from_yaml(yaml: &str) -> ExportResult<Self> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    pub fn from_json(json: &str) -> ExportResult<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    pub fn to_json(&self) -> ExportResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Split into parallel record and result lists
    pub fn split(&self) -> (Vec<InvocationRecord>, Vec<InvocationResult>) {
        self.invocations
            .iter()
            .map(|inv| (inv.record.clone(), inv.result.clone()))
            .unzip()
    }

    /// Terminal index, falling back to the last invocation
    pub fn terminal_index(&self) -> ExportResult<usize> {
        if self.invocations.is_empty() {
            return Err(ExportError::EmptyRequest);
        }

        let index = self.terminal.unwrap_or(self.invocations.len() - 1);
        if index >= self.invocations.len() {
            return Err(ExportError::InvalidTerminal {
                index,
                len: self.invocations.len(),
            });
        }
        Ok(index)
    }
}
