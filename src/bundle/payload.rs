// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! `model_file` payload
//!
//! Concatenates the model weights and transform rules one party holds for
//! the included steps. Layout (little-endian):
//!
//! ```text
//! "PXMF" | u32 layout version | u32 entry count
//! per entry: u8 kind | u32 len + name | u32 len + uri | u64 len + bytes
//! ```

use std::collections::HashSet;
use tracing::debug;

use crate::errors::{ExportError, ExportResult};
use crate::graph::ExportGraph;
use crate::model::{DatasetKind, DatasetRef};
use crate::storage::PayloadSource;

const MAGIC: &[u8; 4] = b"PXMF";
const LAYOUT_VERSION: u32 = 1;

/// What a payload entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Model = 1,
    Rule = 2,
}

impl PayloadKind {
    fn from_dataset(kind: DatasetKind) -> Option<Self> {
        match kind {
            DatasetKind::Model => Some(Self::Model),
            DatasetKind::Rule => Some(Self::Rule),
            _ => None,
        }
    }

    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::Model),
            2 => Some(Self::Rule),
            _ => None,
        }
    }
}

/// One party-owned payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEntry {
    pub kind: PayloadKind,
    pub name: String,
    pub uri: String,
    pub bytes: Vec<u8>,
}

/// Party-private binary half of an artifact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelFile {
    entries: Vec<PayloadEntry>,
}

impl ModelFile {
    /// Collect `party`'s payloads for every model and rule dataset the
    /// included steps consume or produce, in step order.
    pub fn collect(graph: &ExportGraph<'_>, party: &str, source: &dyn PayloadSource) -> ExportResult<Self> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for (_, record, result) in graph.steps() {
            let datasets: Vec<&DatasetRef> = record.inputs.iter().chain(result.outputs.iter()).collect();
            for dataset in datasets {
                let Some(kind) = PayloadKind::from_dataset(dataset.kind()) else {
                    continue;
                };
                if !seen.insert(dataset.key()) {
                    continue;
                }

                for location in dataset.locations_for(party) {
                    let bytes = source.read(location)?;
                    debug!(
                        dataset = %dataset.name,
                        uri = %location.uri,
                        bytes = bytes.len(),
                        "collected payload"
                    );
                    entries.push(PayloadEntry {
                        kind,
                        name: dataset.name.clone(),
                        uri: location.uri.clone(),
                        bytes,
                    });
                }
            }
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PayloadEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode in the private binary layout
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&LAYOUT_VERSION.to_le_bytes());
        out.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());

        for entry in &self.entries {
            out.push(entry.kind as u8);
            write_short(&mut out, entry.name.as_bytes());
            write_short(&mut out, entry.uri.as_bytes());
            out.extend_from_slice(&(entry.bytes.len() as u64).to_le_bytes());
            out.extend_from_slice(&entry.bytes);
        }

        out
    }

    /// Decode a `model_file` entry
    pub fn decode(bytes: &[u8]) -> ExportResult<Self> {
        let mut reader = Reader { bytes, pos: 0 };

        if reader.take(4)? != MAGIC {
            return Err(corrupt("bad magic"));
        }
        let version = reader.u32()?;
        if version != LAYOUT_VERSION {
            return Err(corrupt(&format!("unsupported layout version {}", version)));
        }

        let count = reader.u32()?;
        let mut entries = Vec::new();
        for _ in 0..count {
            let kind = PayloadKind::from_byte(reader.take(1)?[0]).ok_or_else(|| corrupt("bad entry kind"))?;
            let name = reader.short_string()?;
            let uri = reader.short_string()?;
            let len = reader.u64()? as usize;
            let bytes = reader.take(len)?.to_vec();
            entries.push(PayloadEntry { kind, name, uri, bytes });
        }

        if reader.pos != bytes.len() {
            return Err(corrupt("trailing bytes"));
        }

        Ok(Self { entries })
    }
}

fn write_short(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(bytes);
}

fn corrupt(reason: &str) -> ExportError {
    ExportError::InvalidRequest {
        reason: format!("corrupt model_file: {}", reason),
        help: None,
    }
}

struct Reader<'b> {
    bytes: &'b [u8],
    pos: usize,
}

impl<'b> Reader<'b> {
    fn take(&mut self, n: usize) -> ExportResult<&'b [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| corrupt("truncated"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u32(&mut self) -> ExportResult<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn u64(&mut self) -> ExportResult<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    fn short_string(&mut self) -> ExportResult<String> {
        let len = self.u32()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| corrupt("non-utf8 string"))
    }
}
