// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Validator completeness tests: one hand-crafted schema per invariant,
//! each producing exactly the matching error code.

use fastwire::schema::{parse, validate, Schema, WireType, MAX_NESTING_DEPTH};
use fastwire::SchemaError;

fn assert_invalid(schema: &Schema, code: &str) {
    let err = validate(schema).expect_err("schema should be invalid");
    assert_eq!(err.code(), code, "unexpected error: {err}");
}

#[test]
fn test_empty_package() {
    let mut schema = parse("package demo\n\ntype M = int32\n").expect("parse");
    schema.package.clear();
    assert_invalid(&schema, "empty-package");
}

#[test]
fn test_no_messages() {
    let schema = parse("package demo\n\ntype A struct { x int32 }\n").expect("parse");
    assert_invalid(&schema, "no-messages");
}

#[test]
fn test_empty_message_name() {
    let mut schema = parse("package demo\n\ntype M = int32\n").expect("parse");
    schema.messages[0].name.clear();
    assert_invalid(&schema, "empty-message-name");
}

#[test]
fn test_undefined_message_target() {
    let mut schema = parse("package demo\n\ntype M = int32\n").expect("parse");
    schema.messages[0].target = WireType::named("Ghost");
    match validate(&schema).expect_err("invalid") {
        SchemaError::UndefinedType { name, referrer } => {
            assert_eq!(name, "Ghost");
            assert_eq!(referrer, "M");
        }
        other => panic!("expected undefined type, got {other:?}"),
    }
}

#[test]
fn test_undefined_field_type() {
    let mut schema = parse(
        "package demo\n\ntype A struct { x int32 }\n\ntype M = A\n",
    )
    .expect("parse");
    schema.structs[0].fields[0].ty = WireType::named("Ghost");
    match validate(&schema).expect_err("invalid") {
        SchemaError::UndefinedType { name, referrer } => {
            assert_eq!(name, "Ghost");
            assert_eq!(referrer, "A.x");
        }
        other => panic!("expected undefined type, got {other:?}"),
    }
}

#[test]
fn test_empty_struct() {
    let mut schema = parse(
        "package demo\n\ntype A struct { x int32 }\n\ntype M = A\n",
    )
    .expect("parse");
    schema.structs[0].fields.clear();
    assert_invalid(&schema, "empty-struct");
}

#[test]
fn test_empty_field_name() {
    let mut schema = parse(
        "package demo\n\ntype A struct { x int32 }\n\ntype M = A\n",
    )
    .expect("parse");
    schema.structs[0].fields[0].name.clear();
    assert_invalid(&schema, "empty-field-name");
}

#[test]
fn test_direct_cycle() {
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
    match validate(&schema).expect_err("invalid") {
        SchemaError::CircularReference { name } => assert_eq!(name, "Node"),
        other => panic!("expected circular reference, got {other:?}"),
    }
}

#[test]
fn test_cycle_through_array() {
    let schema = parse(
        r#"
package demo

type Tree struct {
    children []Tree
}

type TreeMessage = Tree
"#,
    )
    .expect("parse");
    assert_invalid(&schema, "circular-reference");
}

#[test]
fn test_three_step_cycle() {
    let schema = parse(
        r#"
package demo

type A struct {
    b B
}

type B struct {
    c C
}

type C struct {
    a *A
}

type AMessage = A
"#,
    )
    .expect("parse");
    assert_invalid(&schema, "circular-reference");
}

#[test]
fn test_shared_leaf_is_valid() {
    let schema = parse(
        r#"
package demo

type Leaf struct {
    v int32
}

type Branch struct {
    left  Leaf
    right Leaf
}

type BranchMessage = Branch
"#,
    )
    .expect("parse");
    assert!(validate(&schema).is_ok());
}

#[test]
fn test_nesting_depth_limit() {
    // A chain exactly at the limit passes; one more level fails.
    let mut at_limit = String::from("package demo\n\ntype L0 struct { x int32 }\n");
    for i in 1..MAX_NESTING_DEPTH {
        at_limit.push_str(&format!("type L{i} struct {{ inner L{} }}\n", i - 1));
    }
    at_limit.push_str(&format!("type M = L{}\n", MAX_NESTING_DEPTH - 1));
    let schema = parse(&at_limit).expect("parse");
    assert!(validate(&schema).is_ok());

    let mut over = String::from("package demo\n\ntype L0 struct { x int32 }\n");
    for i in 1..=MAX_NESTING_DEPTH {
        over.push_str(&format!("type L{i} struct {{ inner L{} }}\n", i - 1));
    }
    over.push_str(&format!("type M = L{MAX_NESTING_DEPTH}\n"));
    let schema = parse(&over).expect("parse");
    assert_invalid(&schema, "max-nesting-depth");
}

#[test]
fn test_non_wire_legal_primitives_report_unknown_type() {
    // Unsigned and wide types are not part of the closed primitive set.
    for bad in ["uint8", "uint32", "byte", "float16", "double"] {
        let src = format!(
            "package demo\n\ntype A struct {{ x {bad} }}\n\ntype M = A\n"
        );
        let err = parse(&src).expect_err("should not resolve");
        assert_eq!(err.code(), "unknown-type", "primitive {bad} was accepted");
    }
}

#[test]
fn test_error_display_carries_identifier() {
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
    let err = validate(&schema).expect_err("invalid");
    assert!(err.to_string().contains("Node"));
    let fields = err.log_fields();
    assert_eq!(fields[0].0, "type");
    assert_eq!(fields[0].1, "Node");
}
