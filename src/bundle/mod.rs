// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Artifact bundling
//!
//! Encodes, publishes and verifies per-party export archives.

mod archive;
mod digest;
mod manifest;
mod payload;
mod serializer;
mod verifier;

pub use archive::{publish_file, read_archive, read_entries, write_archive};
pub use digest::{digest, digest_parts};
pub use manifest::{ExportBundle, IncludedStep, Manifest, FORMAT_VERSION, MANIFEST_ENTRY, MODEL_FILE_ENTRY};
pub use payload::{ModelFile, PayloadEntry, PayloadKind};
pub use serializer::{Artifact, BundleSerializer, DEFAULT_COMPRESSION};
pub use verifier::ExportVerifier;
