// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Generate command - emit encoder/decoder source for a target language.

use std::path::PathBuf;

use clap::Args;

use crate::common::{load_schema, Result};
use fastwire::codegen::{generate_to_dir, GeneratorConfig, Target};

/// Generate encoder/decoder source from a schema.
#[derive(Args, Clone, Debug)]
pub struct GenerateCmd {
    /// Schema file
    #[arg(value_name = "SCHEMA")]
    input: PathBuf,

    /// Target language (rust, c, typescript, python)
    #[arg(short, long)]
    target: String,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Generated module/namespace name (defaults to the schema package)
    #[arg(long)]
    package: Option<String>,

    /// Optimization level hint for the native-compile step (0-3)
    #[arg(long, default_value_t = 2)]
    optimize: u8,

    /// Target platform for the native-compile step
    #[arg(long, default_value = "current")]
    platform: String,

    /// Target architecture for the native-compile step
    #[arg(long, default_value = "current")]
    arch: String,

    /// Skip the native-compile step
    #[arg(long)]
    no_compile: bool,
}

impl GenerateCmd {
    pub fn run(self) -> Result<()> {
        let schema = load_schema(&self.input)?;
        let target = Target::parse(&self.target)?;

        let mut config = GeneratorConfig::new(target);
        config.package = self.package;
        config.output_dir = self.out;
        config.optimize = self.optimize.min(3);
        config.platform = self.platform;
        config.arch = self.arch;
        config.no_compile = self.no_compile;

        let path = generate_to_dir(&schema, &config)?;
        println!("generated {}", path.display());

        if !config.no_compile {
            // Native compilation is an external collaborator; the CLI only
            // reports what it would hand off.
            println!(
                "native-compile: target={} optimize={} platform={} arch={}",
                target.as_str(),
                config.optimize,
                config.platform,
                config.arch
            );
        }
        Ok(())
    }
}
