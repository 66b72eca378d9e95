// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Invocation graph
//!
//! Builds the dataset-flow graph between logged invocations, prunes it to
//! the steps a terminal invocation depends on, and renders or validates it.

mod builder;
pub mod render;
mod validation;

pub use builder::{ExportGraph, GraphBuilder};
pub use validation::{RequestValidator, ValidationResult};
