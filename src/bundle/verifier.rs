// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Post-export verification
//!
//! Reopens a published artifact and re-derives its used columns from the
//! decoded manifest alone. Divergence is reported and never corrected.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{info, warn};

use super::archive::read_entries;
use super::manifest::{Manifest, MANIFEST_ENTRY, MODEL_FILE_ENTRY};
use super::payload::ModelFile;
use crate::errors::{ExportError, ExportResult, Mismatch};
use crate::lineage::LineageResolver;

/// Artifact verifier
pub struct ExportVerifier;

impl ExportVerifier {
    /// Verify the archive at `path` against `expected` used columns
    pub fn verify(path: &Path, expected: &BTreeSet<String>) -> ExportResult<Manifest> {
        let entries = Self::unique_entries(read_entries(path)?)?;
        let manifest = Self::verify_entries(&entries, expected)?;
        info!(path = %path.display(), columns = expected.len(), "artifact verified");
        Ok(manifest)
    }

    /// Index entries by name; a repeated name is an entry-set divergence
    fn unique_entries(raw: Vec<(String, Vec<u8>)>) -> ExportResult<BTreeMap<String, Vec<u8>>> {
        let mut entries = BTreeMap::new();
        let mut repeated = BTreeSet::new();

        for (name, data) in raw {
            if entries.contains_key(&name) {
                repeated.insert(name);
            } else {
                entries.insert(name, data);
            }
        }

        if !repeated.is_empty() {
            let mismatch = Mismatch::RepeatedEntries { names: repeated };
            warn!(%mismatch, "archive entry set diverges");
            return Err(ExportError::mismatch(mismatch));
        }
        Ok(entries)
    }

    /// Verify already-read archive entries
    pub fn verify_entries(
        entries: &BTreeMap<String, Vec<u8>>,
        expected: &BTreeSet<String>,
    ) -> ExportResult<Manifest> {
        let required: BTreeSet<String> = [MANIFEST_ENTRY, MODEL_FILE_ENTRY]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let found: BTreeSet<String> = entries.keys().cloned().collect();
        if found != required {
            let mismatch = Mismatch::entry_set(&required, &found);
            warn!(%mismatch, "archive entry set diverges");
            return Err(ExportError::mismatch(mismatch));
        }

        let manifest = Manifest::from_bytes(&entries[MANIFEST_ENTRY])?;
        ModelFile::decode(&entries[MODEL_FILE_ENTRY])?;

        let selected = LineageResolver::selected_columns(manifest.steps.iter().enumerate())?;
        let derived = LineageResolver::combine(&selected, &manifest.lineage);

        if derived != manifest.used_columns {
            let mismatch = Mismatch::Trailer {
                declared: manifest.used_columns.clone(),
                derived,
            };
            warn!(%mismatch, "manifest trailer diverges");
            return Err(ExportError::mismatch(mismatch));
        }

        if &derived != expected {
            let mismatch = Mismatch::used_columns(expected, &derived);
            warn!(%mismatch, "used columns diverge");
            return Err(ExportError::mismatch(mismatch));
        }

        Ok(manifest)
    }
}
