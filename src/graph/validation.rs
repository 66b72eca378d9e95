// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Request validation
//!
//! Checks an export request without writing anything and collects every
//! problem instead of stopping at the first.

use super::GraphBuilder;
use crate::lineage::{parse_attr_path, LineageResolver};
use crate::model::{DatasetKind, ExportRequest, InvocationRecord};

/// Export request validator
pub struct RequestValidator;

impl RequestValidator {
    /// Validate a request against its terminal invocation
    pub fn validate(request: &ExportRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if request.model_name.trim().is_empty() {
            result.add_error("Model name is empty");
        }

        let terminal = match request.terminal_index() {
            Ok(terminal) => terminal,
            Err(e) => {
                result.add_error(&e.to_string());
                return result;
            }
        };

        let (records, results) = request.split();
        let builder = match GraphBuilder::build(&records, &results) {
            Ok(builder) => builder,
            Err(e) => {
                result.add_error(&e.to_string());
                return result;
            }
        };

        for dup in builder.duplicates() {
            result.add_warning(&format!(
                "Invocation #{} repeats invocation #{} and is folded onto it",
                dup,
                builder.canonical(dup)
            ));
        }

        let graph = match builder.prune(terminal) {
            Ok(graph) => graph,
            Err(e) => {
                result.add_error(&e.to_string());
                return result;
            }
        };

        if let Err(e) = LineageResolver::selected_columns(graph.steps().map(|(i, r, _)| (i, r))) {
            result.add_error(&e.to_string());
        }

        for (idx, record) in records.iter().enumerate() {
            if builder.canonical(idx) != idx || graph.contains(idx) {
                continue;
            }
            result.add_warning(&format!(
                "Invocation #{} ({}) does not contribute to invocation #{} and is pruned",
                idx,
                record.component_id(),
                terminal
            ));
            if !record.attrs_aligned() {
                result.add_warning(&format!(
                    "Invocation #{}: attr_paths and attrs differ in length (ignored, step is pruned)",
                    idx
                ));
            }
        }

        for (idx, record, _) in graph.steps() {
            if !Self::selects_columns(record) {
                result.add_warning(&format!(
                    "Invocation #{} ({}) selects no input columns",
                    idx,
                    record.component_id()
                ));
            }
        }

        for dataset in graph.external_inputs() {
            if dataset.kind() == DatasetKind::Table && dataset.schema.is_none() {
                result.add_warning(&format!(
                    "Raw input '{}' has no schema; used columns are not restricted to raw schemas",
                    dataset.name
                ));
            }
        }

        result
    }

    fn selects_columns(record: &InvocationRecord) -> bool {
        record
            .attr_paths
            .iter()
            .any(|path| matches!(parse_attr_path(0, path), Ok(Some(_))))
    }
}

/// Result of request validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DatasetRef, InvocationResult, PartyLocation, SchemaMeta};

    fn table(uri: &str) -> DatasetRef {
        DatasetRef::new(uri, "sf.table.vertical_table", vec![PartyLocation::new(uri, "alice", "csv")])
    }

    fn request(records: Vec<InvocationRecord>, results: Vec<InvocationResult>) -> ExportRequest {
        ExportRequest::new("m", records, results).unwrap()
    }

    #[test]
    fn test_empty_request_invalid() {
        let result = RequestValidator::validate(&request(vec![], vec![]));
        assert!(!result.is_valid());
        assert!(result.errors[0].contains("no invocations"));
    }

    #[test]
    fn test_ambiguous_producers_invalid() {
        let records = vec![
            InvocationRecord::new("a", "one", "1"),
            InvocationRecord::new("a", "two", "1"),
            InvocationRecord::new("ml.train", "t", "1").input(table("x.csv")),
        ];
        let results = vec![
            InvocationResult::new(vec![table("x.csv")]),
            InvocationResult::new(vec![table("x.csv")]),
            InvocationResult::default(),
        ];

        let result = RequestValidator::validate(&request(records, results));
        assert!(!result.is_valid());
        assert!(result.errors[0].contains("produced by both"));
    }

    #[test]
    fn test_pruned_and_schemaless_warned() {
        let train = InvocationRecord::new("ml.train", "ss_sgd_train", "0.0.1")
            .attr("input/train_dataset/feature_selects", vec!["a".to_string()])
            .input(table("x.csv"));
        let stats = InvocationRecord::new("stats", "table_statistics", "0.0.1").input(table("x.csv"));

        let result = RequestValidator::validate(&request(
            vec![stats, train],
            vec![InvocationResult::default(), InvocationResult::default()],
        ));

        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.contains("#0") && w.contains("pruned")));
        assert!(result.warnings.iter().any(|w| w.contains("no schema")));
    }

    #[test]
    fn test_malformed_path_on_included_step_invalid() {
        let train = InvocationRecord::new("ml.train", "t", "1")
            .attr("input/train_dataset/colour", vec!["a".to_string()])
            .input(table("x.csv").with_schema(SchemaMeta::features_of(&["a"], "float32")));

        let result = RequestValidator::validate(&request(vec![train], vec![InvocationResult::default()]));
        assert!(!result.is_valid());
        assert!(result.errors[0].contains("colour"));
    }

    #[test]
    fn test_step_without_selection_warned() {
        let predict = InvocationRecord::new("ml.predict", "p", "1")
            .input(table("x.csv").with_schema(SchemaMeta::features_of(&["a"], "float32")));

        let result = RequestValidator::validate(&request(vec![predict], vec![InvocationResult::default()]));
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.contains("selects no input columns")));
    }
}
