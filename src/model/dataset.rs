// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Distributed dataset references
//!
//! A `DatasetRef` names a dataset split across parties. Its identity for
//! lineage purposes is the set of physical locations it occupies, not its
//! name: the same table is routinely referred to under different names by
//! the components that consume it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{ExportError, ExportResult};

/// One party's physical copy of a dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartyLocation {
    /// Storage URI, resolved by the party's storage layer
    pub uri: String,

    /// Owning party
    #[serde(rename = "party")]
    pub party_id: String,

    /// Data format (csv, orc, ...)
    #[serde(default)]
    pub format: String,
}

impl PartyLocation {
    pub fn new(uri: impl Into<String>, party_id: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            party_id: party_id.into(),
            format: format.into(),
        }
    }
}

/// Column metadata attached to a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaMeta {
    features: Vec<String>,
    feature_types: Vec<String>,
    labels: Vec<String>,
    label_types: Vec<String>,
}

#[derive(Deserialize)]
struct RawSchemaMeta {
    #[serde(default)]
    features: Vec<String>,
    #[serde(default)]
    feature_types: Vec<String>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    label_types: Vec<String>,
}

impl SchemaMeta {
    /// Create schema metadata for `dataset`, checking that every column has a type
    pub fn new(
        dataset: &str,
        features: Vec<String>,
        feature_types: Vec<String>,
        labels: Vec<String>,
        label_types: Vec<String>,
    ) -> ExportResult<Self> {
        if features.len() != feature_types.len() {
            return Err(ExportError::InvalidSchema {
                dataset: dataset.to_string(),
                reason: format!(
                    "{} features but {} feature types",
                    features.len(),
                    feature_types.len()
                ),
            });
        }
        if labels.len() != label_types.len() {
            return Err(ExportError::InvalidSchema {
                dataset: dataset.to_string(),
                reason: format!("{} labels but {} label types", labels.len(), label_types.len()),
            });
        }

        Ok(Self {
            features,
            feature_types,
            labels,
            label_types,
        })
    }

    /// Schema with feature columns only, all of one type
    pub fn features_of(features: &[&str], ty: &str) -> Self {
        Self {
            features: features.iter().map(|s| s.to_string()).collect(),
            feature_types: vec![ty.to_string(); features.len()],
            labels: Vec::new(),
            label_types: Vec::new(),
        }
    }

    /// Add label columns of one type
    pub fn with_labels(mut self, labels: &[&str], ty: &str) -> Self {
        self.labels.extend(labels.iter().map(|s| s.to_string()));
        self.label_types
            .extend(std::iter::repeat(ty.to_string()).take(labels.len()));
        self
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn feature_types(&self) -> &[String] {
        &self.feature_types
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn label_types(&self) -> &[String] {
        &self.label_types
    }

    /// Every column named by the schema, features first
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.features
            .iter()
            .chain(self.labels.iter())
            .map(String::as_str)
    }
}

/// Broad category of a dataset, derived from its type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    /// Tabular data (`sf.table.*`)
    Table,
    /// Trained model (`sf.model.*`)
    Model,
    /// Transform rule (`sf.rule.*`)
    Rule,
    /// Human-facing report (`sf.report`)
    Report,
    /// Anything else
    Other,
}

impl DatasetKind {
    pub fn from_type_tag(tag: &str) -> Self {
        if tag.starts_with("sf.table.") {
            Self::Table
        } else if tag.starts_with("sf.model.") {
            Self::Model
        } else if tag.starts_with("sf.rule.") {
            Self::Rule
        } else if tag == "sf.report" {
            Self::Report
        } else {
            Self::Other
        }
    }

    /// Whether datasets of this kind carry a binary payload for the bundle
    pub fn has_payload(self) -> bool {
        matches!(self, Self::Model | Self::Rule)
    }
}

/// Reference to a distributed dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDatasetRef")]
pub struct DatasetRef {
    /// Logical name (role of the dataset for its consumer)
    pub name: String,

    /// Type tag, e.g. `sf.table.vertical_table`
    #[serde(rename = "type", default)]
    pub type_tag: String,

    /// Per-party locations; empty for placeholder references
    #[serde(rename = "data_refs", default)]
    pub refs: Vec<PartyLocation>,

    /// Column metadata
    #[serde(rename = "meta", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaMeta>,
}

#[derive(Deserialize)]
struct RawDatasetRef {
    name: String,
    #[serde(rename = "type", default)]
    type_tag: String,
    #[serde(rename = "data_refs", default)]
    refs: Vec<PartyLocation>,
    #[serde(default)]
    meta: Option<RawSchemaMeta>,
}

impl TryFrom<RawDatasetRef> for DatasetRef {
    type Error = ExportError;

    fn try_from(raw: RawDatasetRef) -> Result<Self, Self::Error> {
        let schema = raw
            .meta
            .map(|m| SchemaMeta::new(&raw.name, m.features, m.feature_types, m.labels, m.label_types))
            .transpose()?;

        Ok(Self {
            name: raw.name,
            type_tag: raw.type_tag,
            refs: raw.refs,
            schema,
        })
    }
}

impl DatasetRef {
    /// Create a materialized reference
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>, refs: Vec<PartyLocation>) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
            refs,
            schema: None,
        }
    }

    /// Create a placeholder reference identified by name only
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_tag: String::new(),
            refs: Vec::new(),
            schema: None,
        }
    }

    /// Attach schema metadata
    pub fn with_schema(mut self, schema: SchemaMeta) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn kind(&self) -> DatasetKind {
        DatasetKind::from_type_tag(&self.type_tag)
    }

    /// A placeholder carries no physical locations
    pub fn is_placeholder(&self) -> bool {
        self.refs.is_empty()
    }

    /// Lineage identity of this reference
    pub fn key(&self) -> DatasetKey {
        if self.refs.is_empty() {
            return DatasetKey::Placeholder(self.name.clone());
        }

        let mut locations: Vec<(String, String)> = self
            .refs
            .iter()
            .map(|r| (r.party_id.clone(), r.uri.clone()))
            .collect();
        locations.sort();
        DatasetKey::Located(locations)
    }

    /// Locations owned by `party`
    pub fn locations_for<'a>(&'a self, party: &'a str) -> impl Iterator<Item = &'a PartyLocation> + 'a {
        self.refs.iter().filter(move |r| r.party_id == party)
    }
}

/// Identity of a dataset for lineage matching
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatasetKey {
    /// Sorted multiset of `(party, uri)` pairs
    Located(Vec<(String, String)>),
    /// Name of a reference without locations
    Placeholder(String),
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Located(locations) => {
                let parts: Vec<String> = locations
                    .iter()
                    .map(|(party, uri)| format!("{}:{}", party, uri))
                    .collect();
                write!(f, "{}", parts.join(","))
            }
            Self::Placeholder(name) => write!(f, "placeholder:{}", name),
        }
    }
}
