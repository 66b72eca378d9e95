// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Verify command - re-check a published artifact

use colored::Colorize;
use miette::Result;
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::bundle::ExportVerifier;
use crate::utils::{column_list, print_error, print_header, print_success};

/// Run the verify command
pub async fn run(archive: PathBuf, expect: Vec<String>, verbose: bool) -> Result<()> {
    print_header("Verifying artifact");

    if !archive.exists() {
        return Err(miette::miette!("Archive not found: {}", archive.display()));
    }

    let expected: BTreeSet<String> = expect
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    let path = archive.clone();
    let outcome = tokio::task::spawn_blocking(move || ExportVerifier::verify(&path, &expected))
        .await
        .map_err(|e| miette::miette!("Verification task failed: {}", e))?;

    let manifest = match outcome {
        Ok(manifest) => manifest,
        Err(e) => {
            print_error(&format!("{}", archive.display()));
            println!();
            return Err(e.into());
        }
    };

    print_success("Archive holds exactly MANIFEST and model_file");
    print_success(&format!("Used columns: {}", column_list(&manifest.used_columns)));

    if verbose {
        println!();
        println!("{}:", "Steps".bold());
        for (i, id) in manifest.component_ids().iter().enumerate() {
            println!("  {}. {}", i + 1, id);
        }
    }

    println!();
    println!("{}", "Artifact is valid!".green().bold());
    Ok(())
}
