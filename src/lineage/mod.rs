// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Column lineage
//!
//! Resolves which raw input columns the pruned chain actually consumes.
//! Only serving-time selections (features, feature selects, offsets) of
//! included steps count; the result is restricted to the columns present
//! in the raw input schemas so derived columns drop out.

mod roles;

pub use roles::{parse_attr_path, ColumnRole, ColumnSelector};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::errors::{ExportError, ExportResult};
use crate::graph::ExportGraph;
use crate::model::{Attribute, DatasetKind, InvocationRecord};

/// Anything carrying a parallel path/value parameter record
pub trait StepParams {
    fn attr_paths(&self) -> &[String];
    fn attrs(&self) -> &[Attribute];
}

impl StepParams for InvocationRecord {
    fn attr_paths(&self) -> &[String] {
        &self.attr_paths
    }

    fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }
}

/// Column facts of the raw inputs feeding an export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceColumns {
    /// Columns of external table inputs
    pub source_columns: BTreeSet<String>,
    /// Input columns recorded by externally trained models
    pub upstream_model_columns: BTreeSet<String>,
    /// External tables whose columns are unknown
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub unschematized_tables: BTreeSet<String>,
}

impl SourceColumns {
    /// Whether every raw table contributed its columns to the universe
    pub fn is_complete(&self) -> bool {
        !self.source_columns.is_empty() && self.unschematized_tables.is_empty()
    }
}

/// Resolved lineage of an export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lineage {
    pub sources: SourceColumns,
    /// Serving-time columns selected by included steps, raw or derived
    pub selected: BTreeSet<String>,
    /// Raw columns the exported chain consumes
    pub used_columns: BTreeSet<String>,
}

/// Lineage resolver
pub struct LineageResolver;

impl LineageResolver {
    /// Resolve the used columns of a pruned graph
    pub fn resolve(graph: &ExportGraph<'_>) -> ExportResult<Lineage> {
        let selected = Self::selected_columns(graph.steps().map(|(idx, record, _)| (idx, record)))?;
        let sources = Self::source_columns(graph);
        let used_columns = Self::combine(&selected, &sources);

        debug!(
            selected = selected.len(),
            sources = sources.source_columns.len(),
            used = used_columns.len(),
            "resolved column lineage"
        );

        Ok(Lineage {
            sources,
            selected,
            used_columns,
        })
    }

    /// Union of serving-time column selections across `steps`.
    ///
    /// Each item pairs a step with the invocation index reported on error.
    pub fn selected_columns<'s, S, I>(steps: I) -> ExportResult<BTreeSet<String>>
    where
        S: StepParams + 's,
        I: IntoIterator<Item = (usize, &'s S)>,
    {
        let mut selected = BTreeSet::new();

        for (idx, step) in steps {
            let paths = step.attr_paths();
            let attrs = step.attrs();
            if paths.len() != attrs.len() {
                return Err(ExportError::malformed_path(
                    idx,
                    "attr_paths",
                    format!("{} paths for {} attributes", paths.len(), attrs.len()),
                ));
            }

            for (path, attr) in paths.iter().zip(attrs) {
                let Some(selector) = parse_attr_path(idx, path)? else {
                    continue;
                };

                let columns = attr
                    .column_names()
                    .map_err(|e| ExportError::malformed_path(idx, path, e.to_string()))?;

                if selector.role.is_serving_input() {
                    selected.extend(columns.into_iter().map(str::to_string));
                }
            }
        }

        Ok(selected)
    }

    /// Columns of the raw inputs and upstream models feeding `graph`
    pub fn source_columns(graph: &ExportGraph<'_>) -> SourceColumns {
        let mut sources = SourceColumns::default();

        for dataset in graph.external_inputs() {
            match (dataset.kind(), &dataset.schema) {
                (DatasetKind::Table, Some(schema)) => {
                    sources
                        .source_columns
                        .extend(schema.columns().map(str::to_string));
                }
                (DatasetKind::Table, None) => {
                    warn!(dataset = %dataset.name, "raw input table has no schema");
                    sources.unschematized_tables.insert(dataset.name.clone());
                }
                (DatasetKind::Model, Some(schema)) => {
                    sources
                        .upstream_model_columns
                        .extend(schema.features().iter().cloned());
                }
                _ => {}
            }
        }

        sources
    }

    /// Restrict selections to the raw column universe.
    ///
    /// A raw table without a schema may supply any selected column, so the
    /// universe is only applied when every raw table is described.
    pub fn combine(selected: &BTreeSet<String>, sources: &SourceColumns) -> BTreeSet<String> {
        let candidates = selected
            .iter()
            .chain(sources.upstream_model_columns.iter());

        if !sources.is_complete() {
            warn!(
                tables = ?sources.unschematized_tables,
                "raw input schemas incomplete, used columns are not restricted"
            );
            return candidates.cloned().collect();
        }

        candidates
            .filter(|c| sources.source_columns.contains(*c))
            .cloned()
            .collect()
    }
}
