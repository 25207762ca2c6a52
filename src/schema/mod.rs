// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema model, parsing, validation, and analysis.
//!
//! This module covers everything from IDL source text to a validated,
//! analyzed schema:
//! - [`ast`] - the immutable schema model
//! - [`parser`] - Pest-based IDL parser with reference resolution
//! - [`validator`] - structural invariants over a parsed schema
//! - [`analyzer`] - per-type size/reach metadata

pub mod analyzer;
pub mod ast;
pub mod parser;
pub mod validator;

pub use analyzer::{analyze, TypeInfo};
pub use ast::{Field, Message, Schema, StructDecl, WireType};
pub use parser::parse;
pub use validator::{validate, MAX_NESTING_DEPTH};

use crate::core::SchemaError;

/// Parse and validate IDL source in one step.
///
/// This is the common entry point for callers that do not need to inspect
/// the schema between the two phases.
pub fn load(source: &str) -> Result<Schema, SchemaError> {
    let schema = parse(source)?;
    validate(&schema)?;
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_valid_schema() {
        let schema = load(
            r#"
package demo

type Config struct {
    name  string
    value int32
}

type ConfigMessage = Config
"#,
        )
        .expect("load");
        assert_eq!(schema.package, "demo");
    }

    #[test]
    fn test_load_rejects_invalid() {
        let err = load("package demo\n\ntype A struct { x int32 }\n").expect_err("no messages");
        assert_eq!(err.code(), "no-messages");
    }
}
