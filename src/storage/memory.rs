// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! In-memory payload storage

use std::collections::HashMap;

use super::PayloadSource;
use crate::errors::{ExportError, ExportResult};
use crate::model::PartyLocation;

/// Payload source backed by a map of `(party, uri)` to bytes
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    payloads: HashMap<(String, String), Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store bytes for a party's URI
    pub fn insert(&mut self, party: &str, uri: &str, bytes: impl Into<Vec<u8>>) {
        self.payloads
            .insert((party.to_string(), uri.to_string()), bytes.into());
    }

    pub fn with(mut self, party: &str, uri: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(party, uri, bytes);
        self
    }
}

impl PayloadSource for MemoryStore {
    fn read(&self, location: &PartyLocation) -> ExportResult<Vec<u8>> {
        self.payloads
            .get(&(location.party_id.clone(), location.uri.clone()))
            .cloned()
            .ok_or_else(|| ExportError::PayloadUnavailable {
                uri: location.uri.clone(),
                party: location.party_id.clone(),
                error: "no such payload".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payloads_are_party_scoped() {
        let store = MemoryStore::new().with("alice", "model.sf", b"a".to_vec());

        assert_eq!(store.read(&PartyLocation::new("model.sf", "alice", "")).unwrap(), b"a");
        assert!(store.read(&PartyLocation::new("model.sf", "bob", "")).is_err());
    }
}
