// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Fastwire
//!
//! Schema-driven binary serialization toolchain.
//!
//! A compact IDL is parsed into a typed schema model, validated, analyzed,
//! and compiled into encoder/decoder source for multiple target languages.
//! All backends implement one fixed little-endian wire format designed for
//! same-process or same-machine FFI handoff: no versioning, no
//! self-describing tags, uint16 length prefixes, one-byte presence flags.
//!
//! - **[`schema`]** - IDL parser, schema model, validator, analyzer
//! - **[`wire`]** - reference wire codec (the bytes every backend must match)
//! - **[`fixture`]** - deterministic JSON-to-wire test fixture conversion
//! - **[`codegen`]** - per-language source emitters (Rust, C, TypeScript,
//!   Python)
//!
//! ## Example: schema to generated source
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use fastwire::codegen::{generate, GeneratorConfig, Target};
//! use fastwire::schema;
//!
//! let schema = schema::load(
//!     "package demo\n\ntype Config struct {\n    value int32\n}\n\ntype M = Config\n",
//! )?;
//! let generated = generate(&schema, &GeneratorConfig::new(Target::Rust))?;
//! println!("{}", generated.source);
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: JSON fixture to wire bytes
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use fastwire::{fixture, schema};
//!
//! let schema = schema::load("package demo\n\ntype IntList = []int32\n")?;
//! let bytes = fixture::convert(&schema, "IntList", b"[1, 2, 3]")?;
//! assert_eq!(bytes[..2], [0x03, 0x00]);
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use crate::core::{
    FieldMap, FixtureError, GenerateError, Primitive, SchemaError, Value, WireError,
};

// Schema parsing, validation, and analysis
pub mod schema;

// Reference wire codec
pub mod wire;

// JSON fixture conversion
pub mod fixture;

// Code generation
pub mod codegen;
