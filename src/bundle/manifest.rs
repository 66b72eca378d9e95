// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Bundle manifest
//!
//! The manifest is the public half of an artifact: it holds only values
//! every party agreed on during training, so all parties' manifests for one
//! export are byte-identical.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::errors::ExportResult;
use crate::lineage::{Lineage, SourceColumns, StepParams};
use crate::model::{Attribute, InvocationRecord};

/// Archive entry holding the manifest
pub const MANIFEST_ENTRY: &str = "MANIFEST";

/// Archive entry holding the party's binary payload
pub const MODEL_FILE_ENTRY: &str = "model_file";

/// Manifest layout version
pub const FORMAT_VERSION: &str = "1";

/// An included invocation without its execution-time routing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncludedStep {
    pub domain: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub attr_paths: Vec<String>,
    #[serde(default)]
    pub attrs: Vec<Attribute>,
}

impl From<&InvocationRecord> for IncludedStep {
    fn from(record: &InvocationRecord) -> Self {
        Self {
            domain: record.domain.clone(),
            name: record.name.clone(),
            version: record.version.clone(),
            attr_paths: record.attr_paths.clone(),
            attrs: record.attrs.clone(),
        }
    }
}

impl StepParams for IncludedStep {
    fn attr_paths(&self) -> &[String] {
        &self.attr_paths
    }

    fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }
}

/// Ordered included steps and the columns they consume
#[derive(Debug, Clone, PartialEq)]
pub struct ExportBundle {
    steps: Vec<IncludedStep>,
    sources: SourceColumns,
    used_columns: BTreeSet<String>,
}

impl ExportBundle {
    /// Bundle topologically ordered records with their resolved lineage
    pub fn new<'r>(records: impl IntoIterator<Item = &'r InvocationRecord>, lineage: &Lineage) -> Self {
        Self {
            steps: records.into_iter().map(IncludedStep::from).collect(),
            sources: lineage.sources.clone(),
            used_columns: lineage.used_columns.clone(),
        }
    }

    pub fn steps(&self) -> &[IncludedStep] {
        &self.steps
    }

    pub fn used_columns(&self) -> &BTreeSet<String> {
        &self.used_columns
    }

    pub fn sources(&self) -> &SourceColumns {
        &self.sources
    }
}

/// Decoded `MANIFEST` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: String,
    pub model_name: String,
    #[serde(default)]
    pub model_desc: String,
    /// Included steps, producers before consumers
    pub steps: Vec<IncludedStep>,
    /// Raw column facts used to re-derive the trailer
    pub lineage: SourceColumns,
    /// Raw columns the model consumes
    pub used_columns: BTreeSet<String>,
}

impl Manifest {
    pub fn new(model_name: &str, model_desc: &str, bundle: &ExportBundle) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            model_name: model_name.to_string(),
            model_desc: model_desc.to_string(),
            steps: bundle.steps.clone(),
            lineage: bundle.sources.clone(),
            used_columns: bundle.used_columns.clone(),
        }
    }

    /// Encode as pretty JSON
    pub fn to_bytes(&self) -> ExportResult<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> ExportResult<Self> {
        serde_json::from_slice(bytes).map_err(Into::into)
    }

    /// `domain/name@version` of every step
    pub fn component_ids(&self) -> Vec<String> {
        self.steps
            .iter()
            .map(|s| format!("{}/{}@{}", s.domain, s.name, s.version))
            .collect()
    }
}
