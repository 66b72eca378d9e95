// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Payload storage
//!
//! The exporter never touches another party's data: it asks a
//! `PayloadSource` for the bytes behind locations owned by the exporting
//! party only.

mod filesystem;
mod memory;

pub use filesystem::FilesystemStore;
pub use memory::MemoryStore;

use crate::errors::ExportResult;
use crate::model::PartyLocation;

/// Trait for resolving dataset locations to bytes
pub trait PayloadSource: Send + Sync {
    /// Read the full contents behind a location
    fn read(&self, location: &PartyLocation) -> ExportResult<Vec<u8>>;
}

impl<T: PayloadSource + ?Sized> PayloadSource for &T {
    fn read(&self, location: &PartyLocation) -> ExportResult<Vec<u8>> {
        (**self).read(location)
    }
}

impl<T: PayloadSource + ?Sized> PayloadSource for Box<T> {
    fn read(&self, location: &PartyLocation) -> ExportResult<Vec<u8>> {
        (**self).read(location)
    }
}
