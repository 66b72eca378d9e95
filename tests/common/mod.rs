// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Shared fixtures: a vertically partitioned preprocessing + GLM chain

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::Path;

use pipexport::model::{
    DatasetRef, ExportRequest, InvocationRecord, InvocationResult, PartyLocation, SchemaMeta,
};
use pipexport::storage::MemoryStore;

pub const PARTIES: [&str; 2] = ["alice", "bob"];

/// Uris of every model and rule payload the chain produces
pub const PAYLOAD_URIS: [&str; 4] = ["bin.rule", "calc.rule", "onehot.rule", "glm.model"];

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Dataset held by both parties under per-party uris
fn split(name: &str, type_tag: &str, stem: &str) -> DatasetRef {
    DatasetRef::new(
        name,
        type_tag,
        PARTIES
            .iter()
            .map(|p| PartyLocation::new(format!("{stem}_{p}.csv"), *p, "csv"))
            .collect(),
    )
}

/// Payload dataset held by both parties under one uri
fn shared(name: &str, type_tag: &str, uri: &str) -> DatasetRef {
    DatasetRef::new(
        name,
        type_tag,
        PARTIES.iter().map(|p| PartyLocation::new(uri, *p, "")).collect(),
    )
}

pub fn raw_table() -> DatasetRef {
    split("input_data", "sf.table.vertical_table", "raw").with_schema(
        SchemaMeta::features_of(
            &[
                "f1", "f2", "f3", "f4", "unused1", "b1", "o1", "f5", "f6", "f7", "f8", "unused2", "b2", "o2",
            ],
            "float32",
        )
        .with_labels(&["y"], "float32"),
    )
}

pub fn bin_rule() -> DatasetRef {
    shared("bin_rule", "sf.rule.binning", "bin.rule")
}

pub fn glm_model() -> DatasetRef {
    shared("output_model", "sf.model.ss_glm", "glm.model")
}

/// Serving columns of the trained GLM, as recorded in its model schema
pub fn glm_model_with_schema() -> DatasetRef {
    glm_model().with_schema(SchemaMeta::features_of(
        &[
            "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "b1", "b2", "o1_2", "o2_1", "o2_2",
        ],
        "float32",
    ))
}

pub fn binning() -> (InvocationRecord, InvocationResult) {
    let record = InvocationRecord::new("feature", "vert_binning", "0.0.2")
        .attr("input/input_data/feature_selects", strings(&["b1", "b2"]))
        .attr("bin_num", 4i64)
        .input(raw_table())
        .output_uri("bin.rule");
    (record, InvocationResult::new(vec![bin_rule()]))
}

pub fn bin_substitution() -> (InvocationRecord, InvocationResult) {
    let record = InvocationRecord::new("preprocessing", "vert_bin_substitution", "0.0.1")
        .input(raw_table())
        .input(bin_rule())
        .output_uri("sub");
    (
        record,
        InvocationResult::new(vec![split("out_ds", "sf.table.vertical_table", "sub")]),
    )
}

pub fn feature_calculate() -> (InvocationRecord, InvocationResult) {
    let record = InvocationRecord::new("preprocessing", "feature_calculate", "0.0.1")
        .attr("rules", r#"{"rules":[{"op":"STANDARDIZE"}]}"#)
        .attr("input/in_ds/features", strings(&["b1", "b2"]))
        .input(split("in_ds", "sf.table.vertical_table", "sub"))
        .output_uri("calc.rule");
    (
        record,
        InvocationResult::new(vec![shared("out_rules", "sf.rule.feature_calculate", "calc.rule")]),
    )
}

pub fn calc_substitution() -> (InvocationRecord, InvocationResult) {
    let record = InvocationRecord::new("preprocessing", "substitution", "0.0.2")
        .input(split("input_dataset", "sf.table.vertical_table", "sub"))
        .input(shared("input_rules", "sf.rule.feature_calculate", "calc.rule"))
        .output_uri("calc");
    (
        record,
        InvocationResult::new(vec![split("out_ds", "sf.table.vertical_table", "calc")]),
    )
}

pub fn onehot() -> (InvocationRecord, InvocationResult) {
    let record = InvocationRecord::new("preprocessing", "onehot_encode", "0.0.2")
        .attr("drop_first", false)
        .attr("input/input_dataset/features", strings(&["o1", "o2"]))
        .input(split("input_dataset", "sf.table.vertical_table", "calc"))
        .output_uri("onehot");
    (
        record,
        InvocationResult::new(vec![
            split("out_ds", "sf.table.vertical_table", "onehot"),
            shared("out_rules", "sf.rule.onehot", "onehot.rule"),
        ]),
    )
}

pub fn train() -> (InvocationRecord, InvocationResult) {
    let record = InvocationRecord::new("ml.train", "ss_glm_train", "0.0.1")
        .attr("epochs", 3i64)
        .attr("learning_rate", 0.25)
        .attr("label_dist_type", "Gamma")
        .attr("input/train_dataset/label", strings(&["y"]))
        .attr(
            "input/train_dataset/feature_selects",
            strings(&[
                "f2", "f3", "f4", "f5", "f6", "f7", "f8", "b1", "b2", "o1_2", "o2_1", "o2_2",
            ]),
        )
        .attr("input/train_dataset/offset", strings(&["f1"]))
        .attr("input/train_dataset/weight", strings(&[]))
        .input(split("train_dataset", "sf.table.vertical_table", "onehot"))
        .output_uri("glm.model");
    (record, InvocationResult::new(vec![glm_model()]))
}

pub fn predict(model: DatasetRef) -> (InvocationRecord, InvocationResult) {
    let record = InvocationRecord::new("ml.predict", "ss_glm_predict", "0.0.1")
        .attr("receiver", "alice")
        .attr("pred_name", "pred")
        .attr("save_label", true)
        .input(model)
        .input(split("feature_dataset", "sf.table.vertical_table", "onehot"))
        .output_uri("pred.csv");
    (
        record,
        InvocationResult::new(vec![DatasetRef::new(
            "pred",
            "sf.table.individual_table",
            vec![PartyLocation::new("pred.csv", "alice", "csv")],
        )]),
    )
}

/// Statistics over the raw table; never needed by the model
pub fn stats() -> (InvocationRecord, InvocationResult) {
    let record = InvocationRecord::new("stats", "table_statistics", "0.0.2")
        .attr("input/input_data/features", strings(&["unused1", "unused2"]))
        .input(raw_table())
        .output_uri("stats");
    (
        record,
        InvocationResult::new(vec![shared("report", "sf.report", "stats")]),
    )
}

pub fn request(name: &str, steps: Vec<(InvocationRecord, InvocationResult)>) -> ExportRequest {
    let (records, results) = steps.into_iter().unzip();
    ExportRequest::new(name, records, results).expect("records and results align")
}

/// Full chain ending at training, with an unrelated statistics step mixed in
pub fn glm_chain() -> ExportRequest {
    request(
        "glm",
        vec![
            binning(),
            stats(),
            bin_substitution(),
            feature_calculate(),
            calc_substitution(),
            onehot(),
            train(),
        ],
    )
}

/// Columns the exported GLM chain consumes
pub fn glm_used_columns() -> BTreeSet<String> {
    set(&[
        "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "b1", "b2", "o1", "o2",
    ])
}

/// Single training step over `a0..a3` and `b0..b3`
pub fn sgd_request() -> ExportRequest {
    let features = [
        "a0", "a1", "a2", "a3", "b0", "b1", "b2", "b3",
    ];
    let train = InvocationRecord::new("ml.train", "ss_sgd_train", "0.0.1")
        .attr("epochs", 3i64)
        .attr("learning_rate", 0.3)
        .attr("batch_size", 32i64)
        .attr("sig_type", "t1")
        .attr("reg_type", "logistic")
        .attr("input/train_dataset/label", strings(&["y"]))
        .attr("input/train_dataset/feature_selects", strings(&features))
        .input(
            split("train_dataset", "sf.table.vertical_table", "train").with_schema(
                SchemaMeta::features_of(&features, "float32").with_labels(&["y"], "float32"),
            ),
        )
        .output_uri("sgd.model");
    request(
        "sgd",
        vec![(
            train,
            InvocationResult::new(vec![shared("output_model", "sf.model.ss_sgd", "sgd.model")]),
        )],
    )
}

/// Payloads for every party, with party-specific bytes
pub fn memory_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    for party in PARTIES {
        for uri in PAYLOAD_URIS.iter().chain(["sgd.model"].iter()) {
            store.insert(party, uri, format!("{party}:{uri}").into_bytes());
        }
    }
    store
}

/// Write `party`'s payloads under `root`
pub fn write_payloads(root: &Path, party: &str) {
    std::fs::create_dir_all(root).unwrap();
    for uri in PAYLOAD_URIS.iter().chain(["sgd.model"].iter()) {
        std::fs::write(root.join(uri), format!("{party}:{uri}")).unwrap();
    }
}
