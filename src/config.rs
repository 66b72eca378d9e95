// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Export configuration
//!
//! Per-party settings for the `export` command. Loaded from YAML, TOML or
//! JSON; command-line flags override individual values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::bundle::DEFAULT_COMPRESSION;
use crate::errors::{ExportError, ExportResult};

/// Export settings of one party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Exporting party id
    #[serde(default)]
    pub party: Option<String>,

    /// Directory that dataset uris are relative to
    #[serde(default)]
    pub storage_root: Option<PathBuf>,

    /// Archive destination
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Optional JSON report destination
    #[serde(default)]
    pub report: Option<PathBuf>,

    /// Re-open and verify the archive after publishing
    #[serde(default = "default_verify")]
    pub verify: bool,

    /// Gzip level, 0-9
    #[serde(default = "default_compression")]
    pub compression_level: u32,
}

fn default_verify() -> bool {
    true
}

fn default_compression() -> u32 {
    DEFAULT_COMPRESSION
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            party: None,
            storage_root: None,
            output: None,
            report: None,
            verify: default_verify(),
            compression_level: default_compression(),
        }
    }
}

impl ExportConfig {
    /// Load from a file, picking the format by extension
    pub fn load(path: &Path) -> ExportResult<Self> {
        if !path.exists() {
            return Err(ExportError::FileNotFound {
                path: path.to_path_buf(),
                help: Some("Pass an existing configuration file with --config".into()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ExportError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::parse(&content, ext).ok_or_else(|| ExportError::ConfigFormat {
            path: path.to_path_buf(),
        })?
    }

    /// Parse `content` in the format named by `ext`; `None` if unsupported
    pub fn parse(content: &str, ext: &str) -> Option<ExportResult<Self>> {
        let parsed = match ext {
            "yaml" | "yml" => serde_yaml::from_str(content).map_err(ExportError::from),
            "toml" => toml::from_str(content).map_err(ExportError::from),
            "json" => serde_json::from_str(content).map_err(ExportError::from),
            _ => return None,
        };
        Some(parsed)
    }

    /// Compression level clamped to the gzip range
    pub fn compression(&self) -> u32 {
        self.compression_level.min(9)
    }
}
