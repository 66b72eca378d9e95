// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Archive writing and reading
//!
//! Artifacts are gzip-compressed tarballs with fixed header metadata, so
//! identical inputs give byte-identical files. Every file is written to a
//! temporary sibling and renamed into place.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::{ExportError, ExportResult};

fn write_failure(path: &Path, error: impl ToString) -> ExportError {
    ExportError::ArchiveWriteFailure {
        path: path.to_path_buf(),
        error: error.to_string(),
    }
}

fn read_failure(path: &Path, error: impl ToString) -> ExportError {
    ExportError::ArchiveReadError {
        path: path.to_path_buf(),
        error: error.to_string(),
    }
}

/// Write `bytes` to `path` atomically
pub fn publish_file(path: &Path, bytes: &[u8]) -> ExportResult<()> {
    publish_with(path, |file| file.write_all(bytes))
}

/// Create a temp file beside `path`, fill it, and rename it over `path`
fn publish_with<F>(path: &Path, fill: F) -> ExportResult<()>
where
    F: FnOnce(&mut std::fs::File) -> std::io::Result<()>,
{
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| write_failure(path, e))?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| write_failure(path, e))?;
    fill(temp.as_file_mut()).map_err(|e| write_failure(path, e))?;
    temp.as_file().sync_all().map_err(|e| write_failure(path, e))?;
    temp.persist(path).map_err(|e| write_failure(path, e.error))?;

    debug!(path = %path.display(), "published file");
    Ok(())
}

/// Write named entries into a gzip tarball at `path`
pub fn write_archive(path: &Path, entries: &[(&str, &[u8])], level: u32) -> ExportResult<()> {
    publish_with(path, |file| {
        let encoder = GzEncoder::new(file, Compression::new(level.min(9)));
        let mut tar = tar::Builder::new(encoder);

        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_mtime(0);
            header.set_uid(0);
            header.set_gid(0);
            tar.append_data(&mut header, name, *data)?;
        }

        let encoder = tar.into_inner()?;
        encoder.finish()?.flush()
    })
}

/// Read every entry of a gzip tarball in archive order, repeats included
pub fn read_entries(path: &Path) -> ExportResult<Vec<(String, Vec<u8>)>> {
    let file = std::fs::File::open(path).map_err(|e| read_failure(path, e))?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    let mut entries = Vec::new();

    for entry in archive.entries().map_err(|e| read_failure(path, e))? {
        let mut entry = entry.map_err(|e| read_failure(path, e))?;
        let name = entry
            .path()
            .map_err(|e| read_failure(path, e))?
            .to_string_lossy()
            .into_owned();

        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| read_failure(path, e))?;
        entries.push((name, data));
    }

    Ok(entries)
}

/// Read a gzip tarball into a name map, refusing repeated names
pub fn read_archive(path: &Path) -> ExportResult<BTreeMap<String, Vec<u8>>> {
    let mut entries = BTreeMap::new();
    for (name, data) in read_entries(path)? {
        if entries.contains_key(&name) {
            return Err(read_failure(path, format!("entry '{}' appears more than once", name)));
        }
        entries.insert(name, data);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_archive_entries_readable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out/model.tar.gz");

        write_archive(
            &path,
            &[("MANIFEST", &b"{}"[..]), ("model_file", &b"\x00\x01"[..])],
            6,
        )
        .unwrap();

        let entries = read_archive(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["MANIFEST"], b"{}");
        assert_eq!(entries["model_file"], vec![0u8, 1]);
    }

    #[test]
    fn test_archive_bytes_deterministic() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.tar.gz");
        let b = temp_dir.path().join("b.tar.gz");

        write_archive(&a, &[("MANIFEST", &b"same"[..])], 6).unwrap();
        write_archive(&b, &[("MANIFEST", &b"same"[..])], 6).unwrap();

        assert_eq!(std::fs::read(a).unwrap(), std::fs::read(b).unwrap());
    }

    #[test]
    fn test_publish_replaces_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");
        std::fs::write(&path, "old").unwrap();

        publish_file(&path, b"new").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        let leftovers = std::fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_failed_publish_leaves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("model.tar.gz");

        let result = publish_with(&path, |_| {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        });

        assert!(matches!(result, Err(ExportError::ArchiveWriteFailure { .. })));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_repeated_entry_refused() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("model.tar.gz");
        write_archive(
            &path,
            &[
                ("MANIFEST", &b"{}"[..]),
                ("MANIFEST", &b"{}"[..]),
                ("model_file", &b""[..]),
            ],
            6,
        )
        .unwrap();

        assert_eq!(read_entries(&path).unwrap().len(), 3);
        let err = read_archive(&path).unwrap_err();
        assert!(err.to_string().contains("entry 'MANIFEST' appears more than once"));
    }

    #[test]
    fn test_missing_archive_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_archive(&temp_dir.path().join("absent.tar.gz")).unwrap_err();
        assert!(matches!(err, ExportError::ArchiveReadError { .. }));
    }
}
