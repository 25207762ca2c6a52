// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema validation.
//!
//! Enforces the structural invariants every schema must satisfy before it is
//! handed to the analyzer, the fixture converter, or the code generator:
//!
//! 1. Package is non-empty.
//! 2. At least one message.
//! 3. Every message has a non-empty name.
//! 4. Every named reference resolves to a declared struct.
//! 5. Every struct has at least one field with a non-empty name.
//! 6. No type participates in a reference cycle.
//! 7. Nesting depth (struct-within-struct, array-within-array/struct) is at
//!    most [`MAX_NESTING_DEPTH`].
//!
//! Violations are fatal: validation returns the first error found and no
//! partial schema escapes.

use std::collections::HashSet;

use crate::core::{Primitive, SchemaError};
use crate::schema::ast::{Schema, WireType};

/// Maximum struct/array nesting depth the wire format admits.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Validate a parsed schema against the structural invariants.
pub fn validate(schema: &Schema) -> Result<(), SchemaError> {
    if schema.package.is_empty() {
        return Err(SchemaError::EmptyPackage);
    }
    if schema.messages.is_empty() {
        return Err(SchemaError::NoMessages);
    }

    for message in &schema.messages {
        if message.name.is_empty() {
            return Err(SchemaError::EmptyMessageName);
        }
        check_references(schema, &message.target, &message.name)?;
    }

    for decl in &schema.structs {
        if decl.fields.is_empty() {
            return Err(SchemaError::EmptyStruct {
                name: decl.name.clone(),
            });
        }
        for field in &decl.fields {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyFieldName {
                    type_name: decl.name.clone(),
                });
            }
            check_references(schema, &field.ty, &format!("{}.{}", decl.name, field.name))?;
        }
    }

    check_cycles(schema)?;
    check_depth(schema)?;

    Ok(())
}

/// Check that every named node in a type expression resolves.
fn check_references(schema: &Schema, ty: &WireType, referrer: &str) -> Result<(), SchemaError> {
    match ty {
        WireType::Primitive { .. } => Ok(()),
        WireType::Array { elem, .. } => check_references(schema, elem, referrer),
        WireType::Named { name, .. } => {
            if schema.has_struct(name) {
                Ok(())
            } else if Primitive::is_rejected_name(name) {
                Err(SchemaError::UnknownType { name: name.clone() })
            } else {
                Err(SchemaError::undefined_type(name.clone(), referrer))
            }
        }
    }
}

/// Walk state for the cycle check.
struct CycleWalk<'a> {
    schema: &'a Schema,
    /// Types on the current walk path
    visiting: HashSet<String>,
    /// Types fully explored
    visited: HashSet<String>,
}

/// Detect reference cycles through struct fields and array elements.
///
/// Uses a visiting/visited marker walk: re-entering a type that is still on
/// the current path is a cycle, and the error names that type.
fn check_cycles(schema: &Schema) -> Result<(), SchemaError> {
    let mut walk = CycleWalk {
        schema,
        visiting: HashSet::new(),
        visited: HashSet::new(),
    };
    for decl in &schema.structs {
        walk.visit_struct(&decl.name)?;
    }
    Ok(())
}

impl CycleWalk<'_> {
    fn visit_struct(&mut self, name: &str) -> Result<(), SchemaError> {
        if self.visited.contains(name) {
            return Ok(());
        }
        if self.visiting.contains(name) {
            return Err(SchemaError::CircularReference {
                name: name.to_string(),
            });
        }
        self.visiting.insert(name.to_string());

        // References are already resolved; a missing struct here would be a
        // parser bug, so an absent entry is simply skipped.
        let schema = self.schema;
        if let Some(decl) = schema.get_struct(name) {
            for field in &decl.fields {
                self.visit_type(&field.ty)?;
            }
        }

        self.visiting.remove(name);
        self.visited.insert(name.to_string());
        Ok(())
    }

    fn visit_type(&mut self, ty: &WireType) -> Result<(), SchemaError> {
        match ty {
            WireType::Primitive { .. } => Ok(()),
            WireType::Array { elem, .. } => self.visit_type(elem),
            WireType::Named { name, .. } => self.visit_struct(name),
        }
    }
}

/// Enforce the nesting-depth ceiling on every message root.
fn check_depth(schema: &Schema) -> Result<(), SchemaError> {
    for decl in &schema.structs {
        let depth = struct_depth(schema, &decl.name, 0);
        if depth > MAX_NESTING_DEPTH {
            return Err(SchemaError::MaxNestingDepth {
                name: decl.name.clone(),
                limit: MAX_NESTING_DEPTH,
            });
        }
    }
    for message in &schema.messages {
        let depth = type_depth(schema, &message.target, 0);
        if depth > MAX_NESTING_DEPTH {
            return Err(SchemaError::MaxNestingDepth {
                name: message.name.clone(),
                limit: MAX_NESTING_DEPTH,
            });
        }
    }
    Ok(())
}

/// Depth of a struct: one level for the struct plus its deepest field.
///
/// Runs after the cycle check, so recursion terminates; the `at` guard caps
/// the walk anyway so a malformed graph cannot overflow the stack.
fn struct_depth(schema: &Schema, name: &str, at: usize) -> usize {
    if at > MAX_NESTING_DEPTH {
        return at;
    }
    let Some(decl) = schema.get_struct(name) else {
        return at + 1;
    };
    let deepest = decl
        .fields
        .iter()
        .map(|f| type_depth(schema, &f.ty, at + 1))
        .max()
        .unwrap_or(at + 1);
    deepest.max(at + 1)
}

/// Depth contributed by one type expression.
fn type_depth(schema: &Schema, ty: &WireType, at: usize) -> usize {
    if at > MAX_NESTING_DEPTH {
        return at;
    }
    match ty {
        WireType::Primitive { .. } => at,
        WireType::Array { elem, .. } => type_depth(schema, elem, at + 1),
        WireType::Named { name, .. } => struct_depth(schema, name, at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parser::parse;

    fn valid_schema() -> Schema {
        parse(
            r#"
package demo

type Config struct {
    name  string
    value int32
}

type ConfigMessage = Config
"#,
        )
        .expect("parse")
    }

    #[test]
    fn test_validate_accepts_valid_schema() {
        assert!(validate(&valid_schema()).is_ok());
    }

    #[test]
    fn test_validate_empty_package() {
        let mut schema = valid_schema();
        schema.package.clear();
        let err = validate(&schema).expect_err("should fail");
        assert_eq!(err.code(), "empty-package");
    }

    #[test]
    fn test_validate_no_messages() {
        let mut schema = valid_schema();
        schema.messages.clear();
        let err = validate(&schema).expect_err("should fail");
        assert_eq!(err.code(), "no-messages");
    }

    #[test]
    fn test_validate_empty_message_name() {
        let mut schema = valid_schema();
        schema.messages[0].name.clear();
        let err = validate(&schema).expect_err("should fail");
        assert_eq!(err.code(), "empty-message-name");
    }

    #[test]
    fn test_validate_undefined_message_target() {
        let mut schema = valid_schema();
        schema.messages[0].target = WireType::named("Missing");
        let err = validate(&schema).expect_err("should fail");
        assert_eq!(err.code(), "undefined-type");
    }

    #[test]
    fn test_validate_empty_struct() {
        let mut schema = valid_schema();
        schema.structs[0].fields.clear();
        let err = validate(&schema).expect_err("should fail");
        assert_eq!(err.code(), "empty-struct");
    }

    #[test]
    fn test_validate_empty_field_name() {
        let mut schema = valid_schema();
        schema.structs[0].fields[0].name.clear();
        let err = validate(&schema).expect_err("should fail");
        assert_eq!(err.code(), "empty-field-name");
    }

    #[test]
    fn test_validate_direct_cycle() {
        let schema = parse(
            r#"
package demo

type Node struct {
    next Node
}

type NodeMessage = Node
"#,
        )
        .expect("parse");
        match validate(&schema).expect_err("should fail") {
            SchemaError::CircularReference { name } => assert_eq!(name, "Node"),
            other => panic!("expected circular reference, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_indirect_cycle() {
        let schema = parse(
            r#"
package demo

type A struct {
    b B
}

type B struct {
    items []A
}

type AMessage = A
"#,
        )
        .expect("parse");
        let err = validate(&schema).expect_err("should fail");
        assert_eq!(err.code(), "circular-reference");
    }

    #[test]
    fn test_validate_diamond_is_not_cycle() {
        // Two paths to the same leaf must not be reported as a cycle.
        let schema = parse(
            r#"
package demo

type Leaf struct {
    x int32
}

type Left struct {
    leaf Leaf
}

type Right struct {
    leaf Leaf
}

type Root struct {
    left  Left
    right Right
}

type RootMessage = Root
"#,
        )
        .expect("parse");
        assert!(validate(&schema).is_ok());
    }

    #[test]
    fn test_validate_depth_at_limit() {
        let mut src = String::from("package demo\n\ntype L0 struct { x int32 }\n");
        for i in 1..MAX_NESTING_DEPTH {
            src.push_str(&format!("type L{i} struct {{ inner L{} }}\n", i - 1));
        }
        src.push_str(&format!("type Deep = L{}\n", MAX_NESTING_DEPTH - 1));
        let schema = parse(&src).expect("parse");
        assert!(validate(&schema).is_ok());
    }

    #[test]
    fn test_validate_depth_exceeded() {
        let mut src = String::from("package demo\n\ntype L0 struct { x int32 }\n");
        for i in 1..=MAX_NESTING_DEPTH {
            src.push_str(&format!("type L{i} struct {{ inner L{} }}\n", i - 1));
        }
        src.push_str(&format!("type Deep = L{MAX_NESTING_DEPTH}\n"));
        let schema = parse(&src).expect("parse");
        let err = validate(&schema).expect_err("should fail");
        assert_eq!(err.code(), "max-nesting-depth");
    }

    #[test]
    fn test_validate_deep_array_nesting() {
        let mut ty = String::from("int32");
        for _ in 0..=MAX_NESTING_DEPTH {
            ty = format!("[]{ty}");
        }
        let src = format!("package demo\n\ntype A struct {{ m {ty} }}\n\ntype AMessage = A\n");
        let schema = parse(&src).expect("parse");
        let err = validate(&schema).expect_err("should fail");
        assert_eq!(err.code(), "max-nesting-depth");
    }
}
