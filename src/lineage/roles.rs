// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Column-role attribute paths
//!
//! Attributes under `input/<dataset-role>/<column-role>` name which columns
//! of an input dataset a component reads.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::errors::{ExportError, ExportResult};

/// Role a selected column plays for the consuming component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    /// Explicit feature selection (`feature_selects`)
    FeatureSelects,
    /// Columns transformed by a preprocessing step (`features`)
    Features,
    /// Offset column of a generalized linear model
    Offset,
    /// Training label
    Label,
    /// Sample weight
    Weight,
    /// Prediction column read by evaluators
    Prediction,
}

impl ColumnRole {
    /// Whether the column must be supplied when the exported model serves.
    ///
    /// Labels, sample weights and predictions are only read while training
    /// or evaluating.
    pub fn is_serving_input(self) -> bool {
        matches!(self, Self::FeatureSelects | Self::Features | Self::Offset)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FeatureSelects => "feature_selects",
            Self::Features => "features",
            Self::Offset => "offset",
            Self::Label => "label",
            Self::Weight => "weight",
            Self::Prediction => "prediction",
        }
    }
}

impl FromStr for ColumnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feature_selects" => Ok(Self::FeatureSelects),
            "features" => Ok(Self::Features),
            "offset" => Ok(Self::Offset),
            "label" => Ok(Self::Label),
            "weight" => Ok(Self::Weight),
            "prediction" => Ok(Self::Prediction),
            _ => Err(format!("unrecognized column role '{}'", s)),
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `input/<dataset>/<role>` path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelector {
    pub dataset: String,
    pub role: ColumnRole,
}

fn column_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^input/([^/]+)/([^/]+)$").expect("column path pattern is valid")
    })
}

/// Parse an attribute path.
///
/// Returns `Ok(None)` for ordinary hyperparameter paths. Paths under
/// `input/` must name a dataset and a recognized column role.
pub fn parse_attr_path(invocation: usize, path: &str) -> ExportResult<Option<ColumnSelector>> {
    if !path.starts_with("input/") {
        return Ok(None);
    }

    let caps = column_path_pattern().captures(path).ok_or_else(|| {
        ExportError::malformed_path(invocation, path, "expected input/<dataset>/<column-role>")
    })?;

    let role = caps[2]
        .parse::<ColumnRole>()
        .map_err(|reason| ExportError::malformed_path(invocation, path, reason))?;

    Ok(Some(ColumnSelector {
        dataset: caps[1].to_string(),
        role,
    }))
}
