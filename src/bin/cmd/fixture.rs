// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Fixture command - convert JSON test data to wire-format bytes.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::common::{format_size, hex_dump, load_schema, Result};
use fastwire::fixture::{convert, value_to_json};
use fastwire::wire::MessageCodec;

/// Convert a JSON fixture to wire-format bytes.
#[derive(Args, Clone, Debug)]
pub struct FixtureCmd {
    /// Schema file
    #[arg(value_name = "SCHEMA")]
    schema: PathBuf,

    /// Message name to encode against
    #[arg(value_name = "MESSAGE")]
    message: String,

    /// JSON input file
    #[arg(value_name = "JSON")]
    json: PathBuf,

    /// Output file for the wire bytes (stdout summary only when absent)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Print a hex dump of the wire bytes
    #[arg(long)]
    hex: bool,

    /// Decode the bytes back and print the round-tripped JSON
    #[arg(long)]
    verify: bool,
}

impl FixtureCmd {
    pub fn run(self) -> Result<()> {
        let schema = load_schema(&self.schema)?;
        let json = std::fs::read(&self.json)
            .with_context(|| format!("failed to read fixture '{}'", self.json.display()))?;

        let bytes = convert(&schema, &self.message, &json)
            .with_context(|| format!("fixture conversion failed for '{}'", self.message))?;

        println!("{}: {}", self.message, format_size(bytes.len() as u64));

        if self.hex {
            print!("{}", hex_dump(&bytes));
        }

        if self.verify {
            let codec = MessageCodec::new(&schema, &self.message)?;
            let value = codec.decode(&bytes).context("round-trip decode failed")?;
            println!("{}", serde_json::to_string_pretty(&value_to_json(&value))?);
        }

        if let Some(out) = &self.out {
            std::fs::write(out, &bytes)
                .with_context(|| format!("failed to write '{}'", out.display()))?;
            println!("wrote {}", out.display());
        }

        Ok(())
    }
}
