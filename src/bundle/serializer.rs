// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Bundle serializer
//!
//! Turns a pruned graph and its lineage into one party's artifact: the
//! public `MANIFEST` plus the party-private `model_file`.

use std::path::Path;
use tracing::info;

use super::archive::write_archive;
use super::manifest::{ExportBundle, Manifest, MANIFEST_ENTRY, MODEL_FILE_ENTRY};
use super::payload::ModelFile;
use crate::errors::{ExportError, ExportResult};
use crate::graph::ExportGraph;
use crate::lineage::Lineage;
use crate::storage::PayloadSource;

/// Default gzip level for archives
pub const DEFAULT_COMPRESSION: u32 = 6;

/// One party's encoded artifact, ready to publish
#[derive(Debug, Clone)]
pub struct Artifact {
    party: String,
    manifest: Manifest,
    manifest_bytes: Vec<u8>,
    model_file: ModelFile,
    model_file_bytes: Vec<u8>,
}

impl Artifact {
    pub fn party(&self) -> &str {
        &self.party
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Encoded `MANIFEST` entry
    pub fn manifest_bytes(&self) -> &[u8] {
        &self.manifest_bytes
    }

    pub fn model_file(&self) -> &ModelFile {
        &self.model_file
    }

    /// Encoded `model_file` entry
    pub fn model_file_bytes(&self) -> &[u8] {
        &self.model_file_bytes
    }

    /// Archive entries in write order
    pub fn entries(&self) -> [(&str, &[u8]); 2] {
        [
            (MANIFEST_ENTRY, self.manifest_bytes.as_slice()),
            (MODEL_FILE_ENTRY, self.model_file_bytes.as_slice()),
        ]
    }
}

/// JSON has no NaN or infinity, so such parameters cannot survive the manifest
fn check_finite(graph: &ExportGraph<'_>) -> ExportResult<()> {
    for (idx, record, _) in graph.steps() {
        let mut attrs = record.attr_paths.iter().zip(&record.attrs);
        if let Some((path, attr)) = attrs.find(|(_, a)| !a.is_finite()) {
            return Err(ExportError::NonFiniteAttribute {
                invocation: idx,
                path: path.clone(),
                value: attr.to_string(),
            });
        }
    }
    Ok(())
}

/// Serializer bound to one party's payload storage
pub struct BundleSerializer<'s> {
    source: &'s dyn PayloadSource,
    compression: u32,
}

impl<'s> BundleSerializer<'s> {
    pub fn new(source: &'s dyn PayloadSource) -> Self {
        Self {
            source,
            compression: DEFAULT_COMPRESSION,
        }
    }

    /// Set the gzip level (0-9)
    pub fn with_compression(mut self, level: u32) -> Self {
        self.compression = level.min(9);
        self
    }

    /// Encode the artifact of `party` for a pruned graph
    pub fn serialize(
        &self,
        graph: &ExportGraph<'_>,
        lineage: &Lineage,
        model_name: &str,
        model_desc: &str,
        party: &str,
    ) -> ExportResult<Artifact> {
        check_finite(graph)?;

        let bundle = ExportBundle::new(graph.steps().map(|(_, record, _)| record), lineage);
        let manifest = Manifest::new(model_name, model_desc, &bundle);
        let manifest_bytes = manifest.to_bytes()?;

        let model_file = ModelFile::collect(graph, party, self.source)?;
        let model_file_bytes = model_file.encode();

        info!(
            party,
            steps = manifest.steps.len(),
            payloads = model_file.entries().len(),
            "serialized bundle"
        );

        Ok(Artifact {
            party: party.to_string(),
            manifest,
            manifest_bytes,
            model_file,
            model_file_bytes,
        })
    }

    /// Write the artifact archive to `path`, atomically
    pub fn publish(&self, artifact: &Artifact, path: &Path) -> ExportResult<()> {
        write_archive(path, &artifact.entries(), self.compression)?;
        info!(party = %artifact.party, path = %path.display(), "published artifact");
        Ok(())
    }
}
