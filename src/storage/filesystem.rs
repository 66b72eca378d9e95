// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Filesystem-backed payload storage
//!
//! Resolves relative URIs against a party's storage root.

use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::PayloadSource;
use crate::errors::{ExportError, ExportResult};
use crate::model::PartyLocation;

/// Payload source reading files under a root directory
#[derive(Debug, Clone)]
pub struct FilesystemStore {
    root: PathBuf,
}

impl FilesystemStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a URI under the root; URIs may not escape it
    fn resolve(&self, location: &PartyLocation) -> ExportResult<PathBuf> {
        let relative = Path::new(location.uri.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));

        if escapes || location.uri.is_empty() {
            return Err(ExportError::PayloadUnavailable {
                uri: location.uri.clone(),
                party: location.party_id.clone(),
                error: "uri must be a path inside the storage root".into(),
            });
        }

        Ok(self.root.join(relative))
    }
}

impl PayloadSource for FilesystemStore {
    fn read(&self, location: &PartyLocation) -> ExportResult<Vec<u8>> {
        let path = self.resolve(location)?;
        debug!(path = %path.display(), party = %location.party_id, "reading payload");

        std::fs::read(&path).map_err(|e| ExportError::PayloadUnavailable {
            uri: location.uri.clone(),
            party: location.party_id.clone(),
            error: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reads_relative_uri() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("work")).unwrap();
        std::fs::write(temp_dir.path().join("work/model.sf"), b"weights").unwrap();

        let store = FilesystemStore::new(temp_dir.path());
        let bytes = store
            .read(&PartyLocation::new("work/model.sf", "alice", ""))
            .unwrap();
        assert_eq!(bytes, b"weights");
    }

    #[test]
    fn test_missing_file_reported_with_uri() {
        let temp_dir = TempDir::new().unwrap();
        let store = FilesystemStore::new(temp_dir.path());

        let err = store
            .read(&PartyLocation::new("nope.sf", "bob", ""))
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::PayloadUnavailable { ref uri, ref party, .. } if uri == "nope.sf" && party == "bob"
        ));
    }

    #[test]
    fn test_parent_traversal_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = FilesystemStore::new(temp_dir.path());
        assert!(store
            .read(&PartyLocation::new("../secret", "alice", ""))
            .is_err());
    }
}
