// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema command - validate schemas and inspect analyzer output.

use std::path::PathBuf;

use clap::Subcommand;
use serde::Serialize;

use crate::common::{load_schema, Result};
use fastwire::schema::{analyze, parse, validate};

/// Schema operations.
#[derive(Subcommand, Clone, Debug)]
pub enum SchemaCmd {
    /// Validate that a schema parses and satisfies the wire invariants
    Validate {
        /// Schema file
        #[arg(value_name = "SCHEMA")]
        input: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show per-type analyzer stats (sizes, reach flags, depth)
    Inspect {
        /// Schema file
        #[arg(value_name = "SCHEMA")]
        input: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Validation outcome for JSON output.
#[derive(Serialize)]
struct ValidateReport {
    valid: bool,
    package: Option<String>,
    types: usize,
    messages: usize,
    error: Option<String>,
    code: Option<String>,
}

/// One analyzer row for JSON output.
#[derive(Serialize)]
struct TypeReport {
    name: String,
    fixed_size: Option<usize>,
    max_size: Option<u64>,
    has_strings: bool,
    has_arrays: bool,
    nest_depth: usize,
}

impl SchemaCmd {
    pub fn run(self) -> Result<()> {
        match self {
            SchemaCmd::Validate { input, json } => run_validate(&input, json),
            SchemaCmd::Inspect { input, json } => run_inspect(&input, json),
        }
    }
}

fn run_validate(input: &PathBuf, json: bool) -> Result<()> {
    let source = std::fs::read_to_string(input)?;
    let outcome = parse(&source).and_then(|schema| {
        validate(&schema)?;
        Ok(schema)
    });

    if json {
        let report = match &outcome {
            Ok(schema) => ValidateReport {
                valid: true,
                package: Some(schema.package.clone()),
                types: schema.structs.len(),
                messages: schema.messages.len(),
                error: None,
                code: None,
            },
            Err(err) => ValidateReport {
                valid: false,
                package: None,
                types: 0,
                messages: 0,
                error: Some(err.to_string()),
                code: Some(err.code().to_string()),
            },
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &outcome {
            Ok(schema) => println!(
                "{}: OK (package {}, {} types, {} messages)",
                input.display(),
                schema.package,
                schema.structs.len(),
                schema.messages.len()
            ),
            Err(err) => println!("{}: INVALID [{}] {err}", input.display(), err.code()),
        }
    }

    outcome.map(|_| ()).map_err(Into::into)
}

fn run_inspect(input: &PathBuf, json: bool) -> Result<()> {
    let schema = load_schema(input)?;
    let infos = analyze(&schema);

    let reports: Vec<TypeReport> = infos
        .iter()
        .map(|(name, info)| TypeReport {
            name: name.clone(),
            fixed_size: info.is_fixed_size.then_some(info.fixed_size),
            max_size: info.max_size,
            has_strings: info.has_strings,
            has_arrays: info.has_arrays,
            nest_depth: info.nest_depth,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!("package {}", schema.package);
    println!(
        "{:<24} {:>10} {:>12} {:>8} {:>7} {:>6}",
        "TYPE", "FIXED", "MAX", "STRINGS", "ARRAYS", "DEPTH"
    );
    for report in &reports {
        let fixed = report
            .fixed_size
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let max = report
            .max_size
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unbounded".to_string());
        println!(
            "{:<24} {:>10} {:>12} {:>8} {:>7} {:>6}",
            report.name, fixed, max, report.has_strings, report.has_arrays, report.nest_depth
        );
    }
    Ok(())
}
