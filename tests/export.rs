// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

mod common;

use std::collections::BTreeSet;

use pipexport::bundle::{read_archive, Manifest, ModelFile, MANIFEST_ENTRY, MODEL_FILE_ENTRY};
use pipexport::errors::ExportError;
use pipexport::model::{DatasetRef, InvocationRecord, InvocationResult};
use pipexport::{ExportOptions, ExportVerifier, Exporter, GraphBuilder, LineageResolver};
use tempfile::TempDir;

use common::*;

fn manifest_of(path: &std::path::Path) -> Manifest {
    let entries = read_archive(path).unwrap();
    Manifest::from_bytes(&entries[MANIFEST_ENTRY]).unwrap()
}

#[test]
fn used_columns_follow_serving_selections_through_preprocessing() {
    let temp_dir = TempDir::new().unwrap();
    let options = ExportOptions::new("alice", temp_dir.path().join("glm.tar.gz"));

    let report = Exporter::new(memory_store())
        .export(&glm_chain(), &options)
        .unwrap();

    let used: BTreeSet<String> = report.used_columns.iter().cloned().collect();
    assert_eq!(used, glm_used_columns());
    assert!(!used.contains("unused1"));
    assert!(!used.contains("unused2"));
    assert!(!used.contains("y"));
    assert_eq!(report.desc, "b1,b2,f1,f2,f3,f4,f5,f6,f7,f8,o1,o2");
    assert_eq!(report.verified, Some(true));
}

#[test]
fn manifest_lists_included_steps_in_topological_order() {
    let temp_dir = TempDir::new().unwrap();
    let options = ExportOptions::new("alice", temp_dir.path().join("glm.tar.gz"));
    Exporter::new(memory_store()).export(&glm_chain(), &options).unwrap();

    let manifest = manifest_of(&options.output);
    assert_eq!(
        manifest.component_ids(),
        vec![
            "feature/vert_binning@0.0.2",
            "preprocessing/vert_bin_substitution@0.0.1",
            "preprocessing/feature_calculate@0.0.1",
            "preprocessing/substitution@0.0.2",
            "preprocessing/onehot_encode@0.0.2",
            "ml.train/ss_glm_train@0.0.1",
        ]
    );
    assert_eq!(manifest.used_columns, glm_used_columns());
    assert!(manifest.lineage.source_columns.contains("unused1"));
}

#[test]
fn single_training_step_exports_its_feature_selection() {
    let temp_dir = TempDir::new().unwrap();
    let options = ExportOptions::new("bob", temp_dir.path().join("sgd.tar.gz"));

    let report = Exporter::new(memory_store()).export(&sgd_request(), &options).unwrap();

    assert_eq!(report.steps, vec!["ml.train/ss_sgd_train@0.0.1"]);
    let manifest = manifest_of(&options.output);
    assert_eq!(manifest.steps.len(), 1);
    assert_eq!(
        manifest.used_columns,
        set(&["a0", "a1", "a2", "a3", "b0", "b1", "b2", "b3"])
    );
}

#[test]
fn archive_holds_exactly_manifest_and_model_file() {
    let temp_dir = TempDir::new().unwrap();
    let options = ExportOptions::new("alice", temp_dir.path().join("glm.tar.gz"));
    Exporter::new(memory_store()).export(&glm_chain(), &options).unwrap();

    let entries = read_archive(&options.output).unwrap();
    let names: Vec<&str> = entries.keys().map(String::as_str).collect();
    assert_eq!(names, vec![MANIFEST_ENTRY, MODEL_FILE_ENTRY]);

    let model_file = ModelFile::decode(&entries[MODEL_FILE_ENTRY]).unwrap();
    let uris: Vec<&str> = model_file.entries().iter().map(|e| e.uri.as_str()).collect();
    assert_eq!(uris, vec!["bin.rule", "calc.rule", "onehot.rule", "glm.model"]);
}

#[test]
fn repeated_exports_are_byte_identical() {
    let temp_dir = TempDir::new().unwrap();
    let exporter = Exporter::new(memory_store());
    let first = ExportOptions::new("alice", temp_dir.path().join("first.tar.gz"));
    let second = ExportOptions::new("alice", temp_dir.path().join("second.tar.gz"));

    exporter.export(&glm_chain(), &first).unwrap();
    exporter.export(&glm_chain(), &second).unwrap();

    assert_eq!(
        std::fs::read(&first.output).unwrap(),
        std::fs::read(&second.output).unwrap()
    );
}

#[test]
fn unreachable_invocations_do_not_change_the_export() {
    let temp_dir = TempDir::new().unwrap();
    let exporter = Exporter::new(memory_store());

    let with_stats = ExportOptions::new("alice", temp_dir.path().join("with.tar.gz"));
    exporter.export(&glm_chain(), &with_stats).unwrap();

    let without = request(
        "glm",
        vec![
            binning(),
            bin_substitution(),
            feature_calculate(),
            calc_substitution(),
            onehot(),
            train(),
        ],
    );
    let without_stats = ExportOptions::new("alice", temp_dir.path().join("without.tar.gz"));
    exporter.export(&without, &without_stats).unwrap();

    assert_eq!(
        std::fs::read(&with_stats.output).unwrap(),
        std::fs::read(&without_stats.output).unwrap()
    );
}

#[test]
fn parties_share_manifest_but_not_payload() {
    let temp_dir = TempDir::new().unwrap();
    let exporter = Exporter::new(memory_store());
    let alice = ExportOptions::new("alice", temp_dir.path().join("alice.tar.gz"));
    let bob = ExportOptions::new("bob", temp_dir.path().join("bob.tar.gz"));

    let alice_report = exporter.export(&glm_chain(), &alice).unwrap();
    let bob_report = exporter.export(&glm_chain(), &bob).unwrap();

    let alice_entries = read_archive(&alice.output).unwrap();
    let bob_entries = read_archive(&bob.output).unwrap();
    assert_eq!(alice_entries[MANIFEST_ENTRY], bob_entries[MANIFEST_ENTRY]);
    assert_ne!(alice_entries[MODEL_FILE_ENTRY], bob_entries[MODEL_FILE_ENTRY]);
    assert_eq!(alice_report.manifest_digest, bob_report.manifest_digest);

    let bob_payload = ModelFile::decode(&bob_entries[MODEL_FILE_ENTRY]).unwrap();
    assert!(bob_payload
        .entries()
        .iter()
        .all(|e| e.bytes.starts_with(b"bob:")));
}

#[test]
fn two_producers_of_one_dataset_are_ambiguous() {
    let temp_dir = TempDir::new().unwrap();
    let (mut rival, _) = binning();
    rival.version = "0.0.3".into();

    let request = request(
        "glm",
        vec![
            binning(),
            (rival, InvocationResult::new(vec![bin_rule()])),
            bin_substitution(),
        ],
    );
    let options = ExportOptions::new("alice", temp_dir.path().join("glm.tar.gz"));

    let err = Exporter::new(memory_store()).export(&request, &options).unwrap_err();
    match err {
        ExportError::AmbiguousLineage { first, second, .. } => {
            assert_eq!((first, second), (0, 1));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!options.output.exists());
}

#[test]
fn predict_export_reads_columns_of_externally_trained_model() {
    let temp_dir = TempDir::new().unwrap();
    let request = request(
        "glm_predict",
        vec![
            bin_substitution(),
            feature_calculate(),
            calc_substitution(),
            onehot(),
            predict(glm_model_with_schema()),
        ],
    );
    let options = ExportOptions::new("alice", temp_dir.path().join("predict.tar.gz"));

    let report = Exporter::new(memory_store()).export(&request, &options).unwrap();

    let used: BTreeSet<String> = report.used_columns.iter().cloned().collect();
    assert_eq!(used, glm_used_columns());

    let entries = read_archive(&options.output).unwrap();
    let model_file = ModelFile::decode(&entries[MODEL_FILE_ENTRY]).unwrap();
    let uris: Vec<&str> = model_file.entries().iter().map(|e| e.uri.as_str()).collect();
    assert_eq!(uris, vec!["bin.rule", "calc.rule", "onehot.rule", "glm.model"]);
}

#[test]
fn earlier_terminal_exports_a_prefix_of_the_chain() {
    let temp_dir = TempDir::new().unwrap();
    let mut request = glm_chain();
    request.terminal = Some(5);
    let options = ExportOptions::new("alice", temp_dir.path().join("onehot.tar.gz"));

    let report = Exporter::new(memory_store()).export(&request, &options).unwrap();

    assert_eq!(report.terminal, 5);
    assert_eq!(report.steps.len(), 5);
    assert_eq!(report.desc, "b1,b2,o1,o2");
}

#[test]
fn unproduced_placeholder_is_unresolved() {
    let temp_dir = TempDir::new().unwrap();
    let train = InvocationRecord::new("ml.train", "ss_sgd_train", "0.0.1")
        .input(DatasetRef::placeholder("train_dataset"));
    let request = request("sgd", vec![(train, InvocationResult::default())]);
    let options = ExportOptions::new("alice", temp_dir.path().join("sgd.tar.gz"));

    let err = Exporter::new(memory_store()).export(&request, &options).unwrap_err();
    assert!(matches!(
        err,
        ExportError::UnresolvedDependency { invocation: 0, .. }
    ));
}

#[test]
fn non_finite_parameter_fails_before_publishing() {
    let temp_dir = TempDir::new().unwrap();
    let mut request = sgd_request();
    let record = request.invocations[0].record.clone();
    request.invocations[0].record = record.attr("l2_norm", f64::INFINITY);
    let options = ExportOptions::new("alice", temp_dir.path().join("sgd.tar.gz"));

    let err = Exporter::new(memory_store()).export(&request, &options).unwrap_err();

    assert!(matches!(
        err,
        ExportError::NonFiniteAttribute { invocation: 0, ref path, .. } if path == "l2_norm"
    ));
    assert!(!options.output.exists());
}

#[test]
fn verifier_rejects_other_expectations() {
    let temp_dir = TempDir::new().unwrap();
    let options = ExportOptions::new("alice", temp_dir.path().join("sgd.tar.gz"));
    Exporter::new(memory_store()).export(&sgd_request(), &options).unwrap();

    let err = ExportVerifier::verify(&options.output, &set(&["a0"])).unwrap_err();
    assert!(matches!(err, ExportError::VerificationMismatch { .. }));
}

#[test]
fn concurrent_exports_for_different_terminals() {
    let temp_dir = TempDir::new().unwrap();
    let exporter = Exporter::new(memory_store());
    let full = glm_chain();
    let mut prefix = glm_chain();
    prefix.terminal = Some(5);

    let full_options = ExportOptions::new("alice", temp_dir.path().join("full.tar.gz"));
    let prefix_options = ExportOptions::new("alice", temp_dir.path().join("prefix.tar.gz"));
    let (full_report, prefix_report) = std::thread::scope(|scope| {
        let a = scope.spawn(|| exporter.export(&full, &full_options).unwrap());
        let b = scope.spawn(|| exporter.export(&prefix, &prefix_options).unwrap());
        (a.join().unwrap(), b.join().unwrap())
    });

    assert_eq!(full_report.steps.len(), 6);
    assert_eq!(prefix_report.steps.len(), 5);
}

#[test]
fn pruned_graph_and_lineage_are_deterministic() {
    let request = glm_chain();
    let (records, results) = request.split();

    let runs: Vec<(Vec<usize>, BTreeSet<String>)> = (0..3)
        .map(|_| {
            let builder = GraphBuilder::build(&records, &results).unwrap();
            let graph = builder.prune(6).unwrap();
            let lineage = LineageResolver::resolve(&graph).unwrap();
            (graph.included().to_vec(), lineage.used_columns)
        })
        .collect();

    assert_eq!(runs[0].0, vec![0, 2, 3, 4, 5, 6]);
    assert!(runs.iter().all(|r| r == &runs[0]));
}

#[tokio::test]
async fn export_runs_on_blocking_pool() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("sgd.tar.gz");
    let options = ExportOptions::new("alice", output.clone());

    let report = tokio::task::spawn_blocking(move || {
        Exporter::new(memory_store()).export(&sgd_request(), &options)
    })
    .await
    .unwrap()
    .unwrap();

    assert!(output.exists());
    assert_eq!(report.party, "alice");
}
