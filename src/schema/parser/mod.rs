// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! IDL parser using Pest.
//!
//! Turns schema source text into a [`Schema`] and resolves every symbolic
//! type reference. The surface is small: a package declaration, struct
//! declarations with named typed fields, and message aliases. Duplicate
//! type/field names and unknown type references are surfaced here, before
//! the validator runs.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::core::{Primitive, SchemaError};
use crate::schema::ast::{Field, Message, Schema, StructDecl, WireType};

/// Pest parser for fastwire IDL schema files.
#[derive(Parser)]
#[grammar = "schema/parser/idl.pest"] // Path relative to src/ directory
struct IdlParser;

/// Parse IDL source text into a schema.
///
/// The returned schema has every type reference checked against the declared
/// structs and the built-in primitives, but has not yet been through the
/// validator.
pub fn parse(source: &str) -> Result<Schema, SchemaError> {
    let mut pairs = IdlParser::parse(Rule::schema, source).map_err(pest_error)?;

    // The grammar guarantees exactly one `schema` pair on success.
    let schema_pair = pairs.next().ok_or_else(|| {
        SchemaError::parse(1, 1, "empty parse result")
    })?;

    let mut schema = Schema::new(String::new());

    for item in schema_pair.into_inner() {
        match item.as_rule() {
            Rule::package_decl => {
                schema.package = expect_ident(item)?;
            }
            Rule::struct_decl => {
                let decl = parse_struct_decl(item)?;
                if schema.has_struct(&decl.name) {
                    return Err(SchemaError::DuplicateType { name: decl.name });
                }
                schema.structs.push(decl);
            }
            Rule::alias_decl => {
                let message = parse_alias_decl(item)?;
                if schema.get_message(&message.name).is_some() {
                    return Err(SchemaError::DuplicateType { name: message.name });
                }
                schema.messages.push(message);
            }
            Rule::EOI => {}
            _ => {}
        }
    }

    resolve_references(&schema)?;

    Ok(schema)
}

/// Convert a pest error into a positioned parse error.
fn pest_error(err: pest::error::Error<Rule>) -> SchemaError {
    let (line, column) = match err.line_col {
        pest::error::LineColLocation::Pos((line, column)) => (line, column),
        pest::error::LineColLocation::Span((line, column), _) => (line, column),
    };
    SchemaError::parse(line, column, err.variant.message().to_string())
}

/// Pull the single `ident` out of a declaration pair.
fn expect_ident(pair: Pair<Rule>) -> Result<String, SchemaError> {
    let (line, column) = pair.line_col();
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::ident)
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| SchemaError::parse(line, column, "expected identifier"))
}

/// Parse `type Name struct { ... }`.
fn parse_struct_decl(pair: Pair<Rule>) -> Result<StructDecl, SchemaError> {
    let (line, column) = pair.line_col();
    let mut inner = pair.into_inner().filter(|p| {
        matches!(p.as_rule(), Rule::ident | Rule::field_decl)
    });

    let name = inner
        .next()
        .filter(|p| p.as_rule() == Rule::ident)
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| SchemaError::parse(line, column, "expected struct name"))?;

    let mut decl = StructDecl::new(name);
    for field_pair in inner {
        let field = parse_field_decl(field_pair)?;
        if decl.get_field(&field.name).is_some() {
            return Err(SchemaError::duplicate_field(decl.name, field.name));
        }
        decl.fields.push(field);
    }

    Ok(decl)
}

/// Parse one `name type `tag`` field line.
fn parse_field_decl(pair: Pair<Rule>) -> Result<Field, SchemaError> {
    let (line, column) = pair.line_col();
    let mut inner = pair.into_inner();

    let name = inner
        .next()
        .filter(|p| p.as_rule() == Rule::ident)
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| SchemaError::parse(line, column, "expected field name"))?;

    let ty_pair = inner
        .next()
        .ok_or_else(|| SchemaError::parse(line, column, "expected field type"))?;
    let ty = parse_type_expr(ty_pair)?;

    let mut field = Field::new(name, ty);
    if let Some(tag_pair) = inner.next() {
        let raw = tag_pair.as_str();
        // Strip the delimiting backticks, keep the content verbatim.
        let content = raw.trim_start_matches('`').trim_end_matches('`').to_string();
        field.json_key = parse_json_key(&content);
        field.tag = Some(content);
    }

    Ok(field)
}

/// Parse `type Name = Target`.
fn parse_alias_decl(pair: Pair<Rule>) -> Result<Message, SchemaError> {
    let (line, column) = pair.line_col();
    let mut inner = pair
        .into_inner()
        .filter(|p| matches!(p.as_rule(), Rule::ident | Rule::type_expr));

    let name = inner
        .next()
        .filter(|p| p.as_rule() == Rule::ident)
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| SchemaError::parse(line, column, "expected message name"))?;

    let target_pair = inner
        .next()
        .ok_or_else(|| SchemaError::parse(line, column, "expected message target type"))?;
    let target = parse_type_expr(target_pair)?;

    Ok(Message { name, target })
}

/// Parse a type expression: `*T`, `[]T`, a primitive, or a named reference.
fn parse_type_expr(pair: Pair<Rule>) -> Result<WireType, SchemaError> {
    let (line, column) = pair.line_col();
    let node = pair
        .into_inner()
        .next()
        .ok_or_else(|| SchemaError::parse(line, column, "expected type"))?;

    match node.as_rule() {
        Rule::optional_type => {
            let (line, column) = node.line_col();
            let inner = node
                .into_inner()
                .next()
                .ok_or_else(|| SchemaError::parse(line, column, "expected type after '*'"))?;
            Ok(parse_type_expr(inner)?.into_optional())
        }
        Rule::array_type => {
            let (line, column) = node.line_col();
            let inner = node
                .into_inner()
                .next()
                .ok_or_else(|| SchemaError::parse(line, column, "expected element type"))?;
            Ok(WireType::array(parse_type_expr(inner)?))
        }
        Rule::ident => {
            let name = node.as_str();
            match Primitive::try_from_str(name) {
                Some(prim) => Ok(WireType::primitive(prim)),
                None => Ok(WireType::named(name)),
            }
        }
        _ => Err(SchemaError::parse(line, column, "unexpected type syntax")),
    }
}

/// Extract the JSON key from a tag's `json:"key[,flags]"` entry.
fn parse_json_key(tag: &str) -> Option<String> {
    let start = tag.find("json:\"")? + "json:\"".len();
    let rest = &tag[start..];
    let end = rest.find('"')?;
    let key = rest[..end].split(',').next().unwrap_or("");
    if key.is_empty() || key == "-" {
        None
    } else {
        Some(key.to_string())
    }
}

/// Check that every named reference resolves to a declared struct.
fn resolve_references(schema: &Schema) -> Result<(), SchemaError> {
    for decl in &schema.structs {
        for field in &decl.fields {
            check_resolved(schema, &field.ty, &format!("{}.{}", decl.name, field.name))?;
        }
    }
    for message in &schema.messages {
        check_resolved(schema, &message.target, &message.name)?;
    }
    Ok(())
}

/// Walk one type expression looking for unresolved names.
fn check_resolved(schema: &Schema, ty: &WireType, referrer: &str) -> Result<(), SchemaError> {
    match ty {
        WireType::Primitive { .. } => Ok(()),
        WireType::Array { elem, .. } => check_resolved(schema, elem, referrer),
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
