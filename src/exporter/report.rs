// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Operator-facing export report

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::bundle::publish_file;
use crate::errors::ExportResult;

/// Audit record of one party's export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReport {
    pub model_name: String,
    pub party: String,
    /// Exported invocation position
    pub terminal: usize,
    /// `domain/name@version` of each included step, in manifest order
    pub steps: Vec<String>,
    /// Raw columns the model consumes, sorted
    pub used_columns: Vec<String>,
    /// Comma-joined used columns
    pub desc: String,
    pub archive: PathBuf,
    pub manifest_digest: String,
    pub model_file_digest: String,
    /// Digest over both archive entries
    pub bundle_digest: String,
    /// `None` when verification was skipped
    pub verified: Option<bool>,
}

impl ExportReport {
    /// Multi-line plain-text rendering
    pub fn to_text(&self) -> String {
        let verified = match self.verified {
            Some(true) => "yes",
            Some(false) => "NO",
            None => "skipped",
        };

        let mut out = String::new();
        out.push_str(&format!("model:        {}\n", self.model_name));
        out.push_str(&format!("party:        {}\n", self.party));
        out.push_str(&format!("terminal:     #{}\n", self.terminal));
        out.push_str(&format!("steps:        {}\n", self.steps.len()));
        for step in &self.steps {
            out.push_str(&format!("  - {}\n", step));
        }
        out.push_str(&format!("used columns: {}\n", self.desc));
        out.push_str(&format!("archive:      {}\n", self.archive.display()));
        out.push_str(&format!("MANIFEST:     {}\n", self.manifest_digest));
        out.push_str(&format!("model_file:   {}\n", self.model_file_digest));
        out.push_str(&format!("verified:     {}\n", verified));
        out
    }

    pub fn to_json(&self) -> ExportResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Write the JSON report to `path` atomically
    pub fn write(&self, path: &Path) -> ExportResult<()> {
        let mut json = self.to_json()?;
        json.push('\n');
        publish_file(path, json.as_bytes())
    }
}
