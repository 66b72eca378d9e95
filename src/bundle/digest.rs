// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Content digests for audit trails
//!
//! Uses BLAKE3. Digests go into the operator report, never into the
//! manifest, since `model_file` differs between parties.

use blake3::Hasher;

/// Digest of a byte string as lowercase hex
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    hasher.finalize().to_hex().to_string()
}

/// Digest over several named parts, order-sensitive
pub fn digest_parts<'p>(parts: impl IntoIterator<Item = (&'p str, &'p [u8])>) -> String {
    let mut hasher = Hasher::new();
    for (name, bytes) in parts {
        hasher.update(&(name.len() as u64).to_le_bytes());
        hasher.update(name.as_bytes());
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    hasher.finalize().to_hex().to_string()
}
