// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Logged component invocations

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Attribute, DatasetRef};

/// One logged execution of a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRecord {
    /// Component domain (`ml.train`, `preprocessing`, ...)
    pub domain: String,

    /// Component name
    pub name: String,

    /// Component version
    pub version: String,

    /// Semantic role of each attribute, parallel to `attrs`
    #[serde(default)]
    pub attr_paths: Vec<String>,

    /// Parameter values, parallel to `attr_paths`
    #[serde(default)]
    pub attrs: Vec<Attribute>,

    /// Consumed datasets, in declaration order
    #[serde(default)]
    pub inputs: Vec<DatasetRef>,

    /// URIs the component was asked to write its outputs to
    #[serde(default)]
    pub output_uris: Vec<String>,
}

impl InvocationRecord {
    /// Create a record with no parameters or datasets
    pub fn new(domain: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            version: version.into(),
            attr_paths: Vec::new(),
            attrs: Vec::new(),
            inputs: Vec::new(),
            output_uris: Vec::new(),
        }
    }

    /// Append a parameter
    pub fn attr(mut self, path: impl Into<String>, value: impl Into<Attribute>) -> Self {
        self.attr_paths.push(path.into());
        self.attrs.push(value.into());
        self
    }

    /// Append an input dataset
    pub fn input(mut self, dataset: DatasetRef) -> Self {
        self.inputs.push(dataset);
        self
    }

    /// Append a declared output URI
    pub fn output_uri(mut self, uri: impl Into<String>) -> Self {
        self.output_uris.push(uri.into());
        self
    }

    /// Whether every attribute has a path
    pub fn attrs_aligned(&self) -> bool {
        self.attr_paths.len() == self.attrs.len()
    }

    /// Paths paired with their values
    pub fn params(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attr_paths
            .iter()
            .map(String::as_str)
            .zip(self.attrs.iter())
    }

    /// Look up a parameter by path
    pub fn param(&self, path: &str) -> Option<&Attribute> {
        self.params().find(|(p, _)| *p == path).map(|(_, a)| a)
    }

    /// `domain/name@version`
    pub fn component_id(&self) -> String {
        format!("{}/{}@{}", self.domain, self.name, self.version)
    }
}

impl fmt::Display for InvocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.component_id())
    }
}

/// Datasets produced by executing an invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResult {
    #[serde(default)]
    pub outputs: Vec<DatasetRef>,
}

impl InvocationResult {
    pub fn new(outputs: Vec<DatasetRef>) -> Self {
        Self { outputs }
    }
}
