// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Data model for logged pipeline executions
//!
//! Attributes, dataset references, invocation records and the export
//! request that bundles them.

mod attribute;
mod dataset;
mod invocation;
mod request;

pub use attribute::Attribute;
pub use dataset::{DatasetKey, DatasetKind, DatasetRef, PartyLocation, SchemaMeta};
pub use invocation::{InvocationRecord, InvocationResult};
pub use request::{ExportRequest, LoggedInvocation};
