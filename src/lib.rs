// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! # pipexport - per-party model export
//!
//! `pipexport` turns the log of invocations behind a trained model into a
//! self-contained, per-party archive.
//!
//! ## Pipeline
//!
//! - **Graph building** - link invocations through the datasets they
//!   exchange and prune backward from the exported step
//! - **Lineage** - resolve the raw input columns the kept chain consumes
//! - **Bundling** - write `MANIFEST` and the party's `model_file` into a
//!   deterministic tar.gz, atomically
//! - **Verification** - reopen the archive and re-derive its used columns
//!
//! ## Quick Start
//!
//! ```bash
//! # Check a request
//! pipexport validate request.json
//!
//! # Export alice's artifact
//! pipexport export request.json --party alice --storage-root /data/alice
//!
//! # Re-check it
//! pipexport verify request.alice.tar.gz --expect a0,a1,b0
//! ```

pub mod bundle;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exporter;
pub mod graph;
pub mod lineage;
pub mod model;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use bundle::{BundleSerializer, ExportVerifier, Manifest};
pub use config::ExportConfig;
pub use errors::{ExportError, ExportResult};
pub use exporter::{ExportOptions, ExportReport, Exporter};
pub use graph::{ExportGraph, GraphBuilder};
pub use lineage::{Lineage, LineageResolver};
pub use model::{ExportRequest, InvocationRecord, InvocationResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
