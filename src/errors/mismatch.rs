// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Verification mismatch descriptions

use std::collections::BTreeSet;
use std::fmt;

/// What diverged between a published artifact and the expectation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// The archive's entry names differ from `{MANIFEST, model_file}`
    EntrySet {
        missing: BTreeSet<String>,
        unexpected: BTreeSet<String>,
    },
    /// The archive carries the same entry name more than once
    RepeatedEntries { names: BTreeSet<String> },
    /// The re-derived used columns differ from the expected set
    UsedColumns {
        missing: BTreeSet<String>,
        unexpected: BTreeSet<String>,
    },
    /// The manifest trailer disagrees with the columns its own steps select
    Trailer {
        declared: BTreeSet<String>,
        derived: BTreeSet<String>,
    },
}

impl Mismatch {
    /// Build an entry-set mismatch from the expected and found names
    pub fn entry_set(expected: &BTreeSet<String>, found: &BTreeSet<String>) -> Self {
        Self::EntrySet {
            missing: expected.difference(found).cloned().collect(),
            unexpected: found.difference(expected).cloned().collect(),
        }
    }

    /// Build a used-columns mismatch from the expected and derived sets
    pub fn used_columns(expected: &BTreeSet<String>, derived: &BTreeSet<String>) -> Self {
        Self::UsedColumns {
            missing: expected.difference(derived).cloned().collect(),
            unexpected: derived.difference(expected).cloned().collect(),
        }
    }
}

fn join(set: &BTreeSet<String>) -> String {
    if set.is_empty() {
        "-".to_string()
    } else {
        set.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntrySet {
                missing,
                unexpected,
            } => write!(
                f,
                "archive entries diverge (missing: {}; unexpected: {})",
                join(missing),
                join(unexpected)
            ),
            Self::RepeatedEntries { names } => {
                write!(f, "archive repeats entries: {}", join(names))
            }
            Self::UsedColumns {
                missing,
                unexpected,
            } => write!(
                f,
                "used columns diverge (missing: {}; unexpected: {})",
                join(missing),
                join(unexpected)
            ),
            Self::Trailer { declared, derived } => write!(
                f,
                "manifest declares used columns [{}] but its steps select [{}]",
                join(declared),
                join(derived)
            ),
        }
    }
}
