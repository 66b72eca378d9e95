// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Validate command - check an export request

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::load_request;
use crate::graph::RequestValidator;
use crate::utils::{print_error, print_header, print_section, print_success, print_warning};

/// Run the validate command
pub async fn run(request_path: PathBuf, verbose: bool) -> Result<()> {
    print_header("Validating export request");

    let request = match load_request(&request_path).await {
        Ok(r) => r,
        Err(e) => {
            print_error("Failed to parse request");
            println!();
            return Err(e);
        }
    };

    print_success(&format!(
        "Request parsed ({} invocation{})",
        request.invocations.len(),
        if request.invocations.len() == 1 { "" } else { "s" }
    ));

    let validation = RequestValidator::validate(&request);

    if !validation.errors.is_empty() {
        print_section(&"Errors".red().bold().to_string());
        for error in &validation.errors {
            print_error(error);
        }
    }

    if validation.has_warnings() {
        print_section(&"Warnings".yellow().bold().to_string());
        for warning in &validation.warnings {
            print_warning(warning);
        }
    }

    if verbose {
        print_section("Request summary");
        println!("  Model: {}", request.model_name);
        for (i, inv) in request.invocations.iter().enumerate() {
            println!("    #{} {}", i, inv.record.component_id());
        }
    }

    println!();

    if !validation.is_valid() {
        return Err(miette::miette!("Export request validation failed"));
    }

    if validation.has_warnings() {
        println!("{}", "Request is valid but has warnings.".yellow().bold());
    } else {
        println!("{}", "Request is valid!".green().bold());
    }
    Ok(())
}
