// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Utility modules
//!
//! Terminal helpers for the pipexport CLI.

pub mod colors;
pub mod spinner;

pub use colors::*;
pub use spinner::*;
