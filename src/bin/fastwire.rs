// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Fastwire CLI
//!
//! Command-line front end for the fastwire toolchain.
//!
//! ## Usage
//!
//! ```sh
//! # Validate a schema
//! fastwire schema validate telemetry.fw
//!
//! # Show per-type analyzer stats
//! fastwire schema inspect telemetry.fw
//!
//! # Generate an encoder/decoder for a target language
//! fastwire generate telemetry.fw --target rust --out gen/
//!
//! # Convert a JSON fixture to wire bytes
//! fastwire fixture telemetry.fw ConfigMessage testdata/config.json -o config.bin
//! ```

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{FixtureCmd, GenerateCmd, SchemaCmd};
use common::Result;

/// Fastwire - schema-driven wire format toolchain
///
/// Parse and validate IDL schemas, generate encoder/decoder source for
/// multiple target languages, and convert JSON fixtures to wire bytes.
#[derive(Parser, Clone)]
#[command(name = "fastwire")]
#[command(about = "Schema-driven binary serialization toolchain", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Schema operations (validate, inspect)
    #[command(subcommand)]
    Schema(SchemaCmd),

    /// Generate encoder/decoder source for a target language
    Generate(GenerateCmd),

    /// Convert a JSON fixture to wire-format bytes
    Fixture(FixtureCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Schema(cmd) => cmd.run(),
        Commands::Generate(cmd) => cmd.run(),
        Commands::Fixture(cmd) => cmd.run(),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
