// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Rust backend.
//!
//! Emits a single self-contained `.rs` file with no dependencies: struct
//! declarations, a private read/write prelude, one private helper per
//! compound type expression, and the public `Encode{Root}Message` /
//! `Decode{Root}Message` entry points. Primitives are written with explicit
//! shift-and-mask byte assembly; arrays of fixed-width primitives take a
//! guarded bulk-copy path on little-endian hosts.

use std::fmt::Write;

use heck::ToSnakeCase;

use crate::core::{GenerateError, Primitive};
use crate::schema::{StructDecl, WireType};

use super::naming::{decode_entry, encode_entry, escape_keyword};
use super::{GenContext, MessageEntry};

/// Rust keywords that need escaping when used as field names.
const KEYWORDS: &[&str] = &[
    "as", "async", "await", "box", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while",
];

/// Emit the complete Rust source for a schema.
pub fn emit(ctx: &GenContext) -> Result<String, GenerateError> {
    let mut decls = String::new();
    let mut helpers = HelperSet::default();
    let mut api = String::new();

    for decl in &ctx.schema.structs {
        emit_struct_decl(&mut decls, decl);
        emit_struct_helpers(ctx, &mut helpers, decl)?;
    }
    for entry in &ctx.entries {
        emit_entry(ctx, &mut helpers, &mut api, entry)?;
    }

    let mut out = String::new();
    let _ = writeln!(out, "// Code generated by fastwire. DO NOT EDIT.");
    let _ = writeln!(out, "// package: {}", ctx.package);
    let _ = writeln!(out, "//");
    let _ = writeln!(
        out,
        "// Wire format: little-endian, uint16 length prefixes, one-byte"
    );
    let _ = writeln!(
        out,
        "// presence flags, struct fields in declaration order, no padding."
    );
    out.push_str("#![allow(non_snake_case)]\n");
    out.push_str("#![allow(dead_code)]\n\n");
    out.push_str(PRELUDE);
    out.push('\n');
    out.push_str(&decls);
    out.push_str(&helpers.code);
    out.push_str(&api);
    Ok(out)
}

/// Error types plus the fixed read/write helpers every schema needs.
const PRELUDE: &str = r#"/// Structured decode failure. `code` is stable across backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub code: &'static str,
    pub position: usize,
    pub message: String,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at position {}: {}", self.code, self.position, self.message)
    }
}

impl std::error::Error for DecodeError {}

/// Structured encode failure (length ceiling violations).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for EncodeError {}

fn insufficient(position: usize, needed: usize, have: usize) -> DecodeError {
    DecodeError {
        code: "insufficient-data",
        position,
        message: format!("needed {needed} bytes, have {have}"),
    }
}

fn string_too_long(len: usize) -> EncodeError {
    EncodeError {
        code: "string-too-long",
        message: format!("string of {len} bytes exceeds 65535"),
    }
}

fn array_too_long(len: usize) -> EncodeError {
    EncodeError {
        code: "array-too-long",
        message: format!("array of {len} elements exceeds 65535"),
    }
}

#[inline]
fn write_u16(buf: &mut Vec<u8>, v: u16) {
    buf.push((v & 0xFF) as u8);
    buf.push((v >> 8) as u8);
}

#[inline]
fn write_i16(buf: &mut Vec<u8>, v: i16) {
    write_u16(buf, v as u16);
}

#[inline]
fn write_u32(buf: &mut Vec<u8>, v: u32) {
    buf.push((v & 0xFF) as u8);
    buf.push(((v >> 8) & 0xFF) as u8);
    buf.push(((v >> 16) & 0xFF) as u8);
    buf.push(((v >> 24) & 0xFF) as u8);
}

#[inline]
fn write_i32(buf: &mut Vec<u8>, v: i32) {
    write_u32(buf, v as u32);
}

#[inline]
fn write_u64(buf: &mut Vec<u8>, v: u64) {
    buf.push((v & 0xFF) as u8);
    buf.push(((v >> 8) & 0xFF) as u8);
    buf.push(((v >> 16) & 0xFF) as u8);
    buf.push(((v >> 24) & 0xFF) as u8);
    buf.push(((v >> 32) & 0xFF) as u8);
    buf.push(((v >> 40) & 0xFF) as u8);
    buf.push(((v >> 48) & 0xFF) as u8);
    buf.push(((v >> 56) & 0xFF) as u8);
}

#[inline]
fn write_i64(buf: &mut Vec<u8>, v: i64) {
    write_u64(buf, v as u64);
}

#[inline]
fn write_f32(buf: &mut Vec<u8>, v: f32) {
    write_u32(buf, v.to_bits());
}

#[inline]
fn write_f64(buf: &mut Vec<u8>, v: f64) {
    write_u64(buf, v.to_bits());
}

fn encode_string(value: &str, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    if value.len() > 65535 {
        return Err(string_too_long(value.len()));
    }
    write_u16(buf, value.len() as u16);
    buf.extend_from_slice(value.as_bytes());
    Ok(())
}

#[inline]
fn read_u8(data: &[u8], pos: usize) -> Result<(u8, usize), DecodeError> {
    if pos >= data.len() {
        return Err(insufficient(pos, 1, 0));
    }
    Ok((data[pos], pos + 1))
}

#[inline]
fn read_bool(data: &[u8], pos: usize) -> Result<(bool, usize), DecodeError> {
    let (v, pos) = read_u8(data, pos)?;
    Ok((v != 0, pos))
}

#[inline]
fn read_i8(data: &[u8], pos: usize) -> Result<(i8, usize), DecodeError> {
    let (v, pos) = read_u8(data, pos)?;
    Ok((v as i8, pos))
}

#[inline]
fn read_u16(data: &[u8], pos: usize) -> Result<(u16, usize), DecodeError> {
    if pos + 2 > data.len() {
        return Err(insufficient(pos, 2, data.len().saturating_sub(pos)));
    }
    let v = (data[pos] as u16) | ((data[pos + 1] as u16) << 8);
    Ok((v, pos + 2))
}

#[inline]
fn read_i16(data: &[u8], pos: usize) -> Result<(i16, usize), DecodeError> {
    let (v, pos) = read_u16(data, pos)?;
    Ok((v as i16, pos))
}

#[inline]
fn read_u32(data: &[u8], pos: usize) -> Result<(u32, usize), DecodeError> {
    if pos + 4 > data.len() {
        return Err(insufficient(pos, 4, data.len().saturating_sub(pos)));
    }
    let v = (data[pos] as u32)
        | ((data[pos + 1] as u32) << 8)
        | ((data[pos + 2] as u32) << 16)
        | ((data[pos + 3] as u32) << 24);
    Ok((v, pos + 4))
}

#[inline]
fn read_i32(data: &[u8], pos: usize) -> Result<(i32, usize), DecodeError> {
    let (v, pos) = read_u32(data, pos)?;
    Ok((v as i32, pos))
}

#[inline]
fn read_u64(data: &[u8], pos: usize) -> Result<(u64, usize), DecodeError> {
    if pos + 8 > data.len() {
        return Err(insufficient(pos, 8, data.len().saturating_sub(pos)));
    }
    let v = (data[pos] as u64)
        | ((data[pos + 1] as u64) << 8)
        | ((data[pos + 2] as u64) << 16)
        | ((data[pos + 3] as u64) << 24)
        | ((data[pos + 4] as u64) << 32)
        | ((data[pos + 5] as u64) << 40)
        | ((data[pos + 6] as u64) << 48)
        | ((data[pos + 7] as u64) << 56);
    Ok((v, pos + 8))
}

#[inline]
fn read_i64(data: &[u8], pos: usize) -> Result<(i64, usize), DecodeError> {
    let (v, pos) = read_u64(data, pos)?;
    Ok((v as i64, pos))
}

#[inline]
fn read_f32(data: &[u8], pos: usize) -> Result<(f32, usize), DecodeError> {
    let (bits, pos) = read_u32(data, pos)?;
    Ok((f32::from_bits(bits), pos))
}

#[inline]
fn read_f64(data: &[u8], pos: usize) -> Result<(f64, usize), DecodeError> {
    let (bits, pos) = read_u64(data, pos)?;
    Ok((f64::from_bits(bits), pos))
}

fn read_string(data: &[u8], pos: usize) -> Result<(String, usize), DecodeError> {
    let (len, pos) = read_u16(data, pos)?;
    let len = len as usize;
    if pos + len > data.len() {
        return Err(insufficient(pos, len, data.len().saturating_sub(pos)));
    }
    match std::str::from_utf8(&data[pos..pos + len]) {
        Ok(s) => Ok((s.to_string(), pos + len)),
        Err(_) => Err(DecodeError {
            code: "invalid-utf8",
            position: pos,
            message: "string content is not valid UTF-8".to_string(),
        }),
    }
}

/// Verify `len` elements of `width` bytes fit, reporting the failure at the
/// first element that does not.
fn check_elements(data: &[u8], pos: usize, len: usize, width: usize) -> Result<(), DecodeError> {
    let remaining = data.len().saturating_sub(pos);
    let total = len * width;
    if total <= remaining {
        return Ok(());
    }
    let whole = remaining / width;
    Err(insufficient(pos + whole * width, width, remaining - whole * width))
}
"#;

/// Helpers emitted so far, in first-need order.
#[derive(Default)]
struct HelperSet {
    names: Vec<String>,
    code: String,
}

impl HelperSet {
    fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    fn insert(&mut self, name: String, code: String) {
        self.names.push(name);
        self.code.push_str(&code);
    }
}

/// The Rust type for a type expression.
fn rust_type(ty: &WireType) -> String {
    let base = match ty {
        WireType::Primitive { prim, .. } => scalar_type(*prim).to_string(),
        WireType::Array { elem, .. } => format!("Vec<{}>", rust_type(elem)),
        WireType::Named { name, .. } => name.clone(),
    };
    if ty.is_optional() {
        format!("Option<{base}>")
    } else {
        base
    }
}

fn scalar_type(prim: Primitive) -> &'static str {
    match prim {
        Primitive::Bool => "bool",
        Primitive::Int8 => "i8",
        Primitive::Int16 => "i16",
        Primitive::Int32 => "i32",
        Primitive::Int64 => "i64",
        Primitive::Float32 => "f32",
        Primitive::Float64 => "f64",
        Primitive::String => "String",
    }
}

/// Stable mangled name for a type expression, used in helper names.
fn mangle(ty: &WireType) -> String {
    if ty.is_optional() {
        // The optional layer wraps the non-optional rendering of the base.
        return format!("opt_{}", mangle(&strip_optional(ty)));
    }
    match ty {
        WireType::Primitive { prim, .. } => prim.name().to_string(),
        WireType::Array { elem, .. } => format!("list_{}", mangle(elem)),
        WireType::Named { name, .. } => name.to_snake_case(),
    }
}

fn strip_optional(ty: &WireType) -> WireType {
    match ty {
        WireType::Primitive { prim, .. } => WireType::Primitive {
            prim: *prim,
            optional: false,
        },
        WireType::Array { elem, .. } => WireType::Array {
            elem: elem.clone(),
            optional: false,
        },
        WireType::Named { name, .. } => WireType::Named {
            name: name.clone(),
            optional: false,
        },
    }
}

fn emit_struct_decl(out: &mut String, decl: &StructDecl) {
    let _ = writeln!(out, "#[derive(Debug, Clone, PartialEq)]");
    let _ = writeln!(out, "pub struct {} {{", decl.name);
    for field in &decl.fields {
        let _ = writeln!(
            out,
            "    pub {}: {},",
            escape_keyword(&field.name, KEYWORDS),
            rust_type(&field.ty)
        );
    }
    let _ = writeln!(out, "}}\n");
}

/// Emit encode/decode helpers for one struct and everything its fields need.
fn emit_struct_helpers(
    ctx: &GenContext,
    helpers: &mut HelperSet,
    decl: &StructDecl,
) -> Result<(), GenerateError> {
    for field in &decl.fields {
        ensure_type_helpers(ctx, helpers, &field.ty)?;
    }

    let snake = decl.name.to_snake_case();
    let marker = format!("struct:{}", decl.name);
    if helpers.contains(&marker) {
        return Ok(());
    }

    let mut code = String::new();
    let _ = writeln!(
        code,
        "fn encode_{snake}(value: &{}, buf: &mut Vec<u8>) -> Result<(), EncodeError> {{",
        decl.name
    );
    for field in &decl.fields {
        let access = format!("value.{}", escape_keyword(&field.name, KEYWORDS));
        code.push_str(&encode_stmt(&field.ty, &access, false));
    }
    let _ = writeln!(code, "    Ok(())");
    let _ = writeln!(code, "}}\n");

    let _ = writeln!(
        code,
        "fn decode_{snake}(data: &[u8], pos: usize) -> Result<({}, usize), DecodeError> {{",
        decl.name
    );
    for field in &decl.fields {
        let var = escape_keyword(&field.name, KEYWORDS);
        let _ = writeln!(code, "    let ({var}, pos) = {};", decode_expr(&field.ty));
    }
    let _ = writeln!(code, "    Ok((");
    let _ = writeln!(code, "        {} {{", decl.name);
    for field in &decl.fields {
        let var = escape_keyword(&field.name, KEYWORDS);
        let _ = writeln!(code, "            {var},");
    }
    let _ = writeln!(code, "        }},");
    let _ = writeln!(code, "        pos,");
    let _ = writeln!(code, "    ))");
    let _ = writeln!(code, "}}\n");

    helpers.insert(marker, code);
    Ok(())
}

/// Make sure helpers exist for every compound layer of a type expression.
fn ensure_type_helpers(
    ctx: &GenContext,
    helpers: &mut HelperSet,
    ty: &WireType,
) -> Result<(), GenerateError> {
    if ty.is_optional() {
        let inner = strip_optional(ty);
        ensure_type_helpers(ctx, helpers, &inner)?;
        emit_optional_helper(helpers, ty, &inner);
        return Ok(());
    }
    match ty {
        WireType::Primitive { .. } => Ok(()),
        WireType::Array { elem, .. } => {
            ensure_type_helpers(ctx, helpers, elem)?;
            emit_array_helper(helpers, ty, elem);
            Ok(())
        }
        // Struct helpers are emitted with their declarations.
        WireType::Named { .. } => Ok(()),
    }
}

fn emit_optional_helper(helpers: &mut HelperSet, ty: &WireType, inner: &WireType) {
    let name = mangle(ty);
    if helpers.contains(&name) {
        return;
    }
    let inner_ty = rust_type(inner);
    let mut code = String::new();

    let _ = writeln!(
        code,
        "fn encode_{name}(value: &Option<{inner_ty}>, buf: &mut Vec<u8>) -> Result<(), EncodeError> {{"
    );
    let _ = writeln!(code, "    match value {{");
    let _ = writeln!(code, "        Some(v) => {{");
    let _ = writeln!(code, "            buf.push(1);");
    code.push_str(&indent(&encode_stmt(inner, "v", true), 8));
    let _ = writeln!(code, "        }}");
    let _ = writeln!(code, "        None => buf.push(0),");
    let _ = writeln!(code, "    }}");
    let _ = writeln!(code, "    Ok(())");
    let _ = writeln!(code, "}}\n");

    let _ = writeln!(
        code,
        "fn decode_{name}(data: &[u8], pos: usize) -> Result<(Option<{inner_ty}>, usize), DecodeError> {{"
    );
    let _ = writeln!(code, "    let (tag, pos) = read_u8(data, pos)?;");
    let _ = writeln!(code, "    match tag {{");
    let _ = writeln!(code, "        0 => Ok((None, pos)),");
    let _ = writeln!(code, "        1 => {{");
    let _ = writeln!(code, "            let (v, pos) = {};", decode_expr(inner));
    let _ = writeln!(code, "            Ok((Some(v), pos))");
    let _ = writeln!(code, "        }}");
    let _ = writeln!(code, "        other => Err(DecodeError {{");
    let _ = writeln!(code, "            code: \"invalid-optional-tag\",");
    let _ = writeln!(code, "            position: pos - 1,");
    let _ = writeln!(
        code,
        "            message: format!(\"invalid optional tag 0x{{other:02X}}\"),"
    );
    let _ = writeln!(code, "        }}),");
    let _ = writeln!(code, "    }}");
    let _ = writeln!(code, "}}\n");

    helpers.insert(name, code);
}

fn emit_array_helper(helpers: &mut HelperSet, ty: &WireType, elem: &WireType) {
    let name = mangle(ty);
    if helpers.contains(&name) {
        return;
    }
    let elem_ty = rust_type(elem);
    let mut code = String::new();

    let _ = writeln!(
        code,
        "fn encode_{name}(value: &[{elem_ty}], buf: &mut Vec<u8>) -> Result<(), EncodeError> {{"
    );
    let _ = writeln!(code, "    if value.len() > 65535 {{");
    let _ = writeln!(code, "        return Err(array_too_long(value.len()));");
    let _ = writeln!(code, "    }}");
    let _ = writeln!(code, "    write_u16(buf, value.len() as u16);");
    if let Some(width) = bulk_width(elem) {
        let _ = writeln!(code, "    #[cfg(target_endian = \"little\")]");
        let _ = writeln!(code, "    {{");
        let _ = writeln!(
            code,
            "        // Host layout matches wire layout: one bulk copy."
        );
        let _ = writeln!(code, "        let bytes = unsafe {{");
        let _ = writeln!(
            code,
            "            std::slice::from_raw_parts(value.as_ptr() as *const u8, value.len() * {width})"
        );
        let _ = writeln!(code, "        }};");
        let _ = writeln!(code, "        buf.extend_from_slice(bytes);");
        let _ = writeln!(code, "    }}");
        let _ = writeln!(code, "    #[cfg(not(target_endian = \"little\"))]");
        let _ = writeln!(code, "    for item in value {{");
        code.push_str(&indent(&encode_stmt(elem, "item", true), 8));
        let _ = writeln!(code, "    }}");
    } else {
        let _ = writeln!(code, "    for item in value {{");
        code.push_str(&indent(&encode_stmt(elem, "item", true), 8));
        let _ = writeln!(code, "    }}");
    }
    let _ = writeln!(code, "    Ok(())");
    let _ = writeln!(code, "}}\n");

    let _ = writeln!(
        code,
        "fn decode_{name}(data: &[u8], pos: usize) -> Result<(Vec<{elem_ty}>, usize), DecodeError> {{"
    );
    let _ = writeln!(code, "    let (len, pos) = read_u16(data, pos)?;");
    let _ = writeln!(code, "    let len = len as usize;");
    if let Some(width) = bulk_width(elem) {
        let _ = writeln!(code, "    check_elements(data, pos, len, {width})?;");
        let _ = writeln!(
            code,
            "    let mut out: Vec<{elem_ty}> = Vec::with_capacity(len);"
        );
        let _ = writeln!(code, "    #[cfg(target_endian = \"little\")]");
        let _ = writeln!(code, "    unsafe {{");
        let _ = writeln!(
            code,
            "        // Bounds proven above; copy into the fresh allocation."
        );
        let _ = writeln!(code, "        std::ptr::copy_nonoverlapping(");
        let _ = writeln!(code, "            data.as_ptr().add(pos),");
        let _ = writeln!(code, "            out.as_mut_ptr() as *mut u8,");
        let _ = writeln!(code, "            len * {width},");
        let _ = writeln!(code, "        );");
        let _ = writeln!(code, "        out.set_len(len);");
        let _ = writeln!(code, "    }}");
        let _ = writeln!(code, "    #[cfg(not(target_endian = \"little\"))]");
        let _ = writeln!(code, "    {{");
        let _ = writeln!(code, "        let mut p = pos;");
        let _ = writeln!(code, "        for _ in 0..len {{");
        let _ = writeln!(
            code,
            "            let (v, np) = {};",
            decode_expr_at(elem, "p")
        );
        let _ = writeln!(code, "            out.push(v);");
        let _ = writeln!(code, "            p = np;");
        let _ = writeln!(code, "        }}");
        let _ = writeln!(code, "    }}");
        let _ = writeln!(code, "    Ok((out, pos + len * {width}))");
    } else {
        let _ = writeln!(code, "    let remaining = data.len().saturating_sub(pos);");
        let _ = writeln!(
            code,
            "    let mut out: Vec<{elem_ty}> = Vec::with_capacity(len.min(remaining));"
        );
        let _ = writeln!(code, "    let mut pos = pos;");
        let _ = writeln!(code, "    for _ in 0..len {{");
        let _ = writeln!(code, "        let (v, np) = {};", decode_expr(elem));
        let _ = writeln!(code, "        out.push(v);");
        let _ = writeln!(code, "        pos = np;");
        let _ = writeln!(code, "    }}");
        let _ = writeln!(code, "    Ok((out, pos))");
    }
    let _ = writeln!(code, "}}\n");

    helpers.insert(name, code);
}

/// Element width when an array qualifies for the bulk path.
fn bulk_width(elem: &WireType) -> Option<usize> {
    match elem {
        WireType::Primitive {
            prim,
            optional: false,
        } => prim.size().filter(|w| *w > 1),
        _ => None,
    }
}

/// One encode statement for a type expression.
///
/// `expr` evaluates to the field; `by_ref` says it is already a reference
/// (loop items and match bindings).
fn encode_stmt(ty: &WireType, expr: &str, by_ref: bool) -> String {
    if ty.is_optional() {
        let arg = if by_ref {
            expr.to_string()
        } else {
            format!("&{expr}")
        };
        return format!("encode_{}({arg}, buf)?;\n", mangle(ty));
    }
    match ty {
        WireType::Primitive { prim, .. } => match prim {
            Primitive::String => {
                let arg = if by_ref {
                    expr.to_string()
                } else {
                    format!("&{expr}")
                };
                format!("encode_string({arg}, buf)?;\n")
            }
            Primitive::Bool => {
                let deref = if by_ref { "*" } else { "" };
                format!("buf.push({deref}{expr} as u8);\n")
            }
            Primitive::Int8 => {
                let deref = if by_ref { "*" } else { "" };
                format!("buf.push({deref}{expr} as u8);\n")
            }
            _ => {
                let deref = if by_ref { "*" } else { "" };
                let writer = match prim {
                    Primitive::Int16 => "write_i16",
                    Primitive::Int32 => "write_i32",
                    Primitive::Int64 => "write_i64",
                    Primitive::Float32 => "write_f32",
                    Primitive::Float64 => "write_f64",
                    _ => unreachable!(),
                };
                format!("{writer}(buf, {deref}{expr});\n")
            }
        },
        WireType::Array { .. } | WireType::Named { .. } => {
            let arg = if by_ref {
                expr.to_string()
            } else {
                format!("&{expr}")
            };
            format!("encode_{}({arg}, buf)?;\n", mangle(ty))
        }
    }
}

/// The decode call expression for a type, reading at `pos`.
fn decode_expr(ty: &WireType) -> String {
    decode_expr_at(ty, "pos")
}

fn decode_expr_at(ty: &WireType, pos: &str) -> String {
    if ty.is_optional() {
        return format!("decode_{}(data, {pos})?", mangle(ty));
    }
    match ty {
        WireType::Primitive { prim, .. } => {
            let reader = match prim {
                Primitive::Bool => "read_bool",
                Primitive::Int8 => "read_i8",
                Primitive::Int16 => "read_i16",
                Primitive::Int32 => "read_i32",
                Primitive::Int64 => "read_i64",
                Primitive::Float32 => "read_f32",
                Primitive::Float64 => "read_f64",
                Primitive::String => "read_string",
            };
            format!("{reader}(data, {pos})?")
        }
        WireType::Array { .. } | WireType::Named { .. } => {
            format!("decode_{}(data, {pos})?", mangle(ty))
        }
    }
}

/// Emit the public entry points for one message.
fn emit_entry(
    ctx: &GenContext,
    helpers: &mut HelperSet,
    out: &mut String,
    entry: &MessageEntry,
) -> Result<(), GenerateError> {
    let target = &entry.message.target;
    ensure_type_helpers(ctx, helpers, target)?;

    let value_ty = rust_type(target);
    let capacity = ctx.capacity_hint(&entry.message.name);
    let encode_name = encode_entry(&entry.root);
    let decode_name = decode_entry(&entry.root);

    // Borrowed parameter shape: slices for arrays, references otherwise.
    let (param_ty, param_expr) = match target {
        WireType::Array { elem, optional } if !*optional => {
            (format!("&[{}]", rust_type(elem)), "value")
        }
        _ => (format!("&{value_ty}"), "value"),
    };

    let _ = writeln!(
        out,
        "/// Encode a `{}` message into wire-format bytes.",
        entry.message.name
    );
    let _ = writeln!(
        out,
        "pub fn {encode_name}(value: {param_ty}) -> Result<Vec<u8>, EncodeError> {{"
    );
    let _ = writeln!(
        out,
        "    let mut buf: Vec<u8> = Vec::with_capacity({capacity});"
    );
    code_for_entry_encode(out, target, param_expr);
    let _ = writeln!(out, "    Ok(buf)");
    let _ = writeln!(out, "}}\n");

    let _ = writeln!(
        out,
        "/// Decode a `{}` message from wire-format bytes.",
        entry.message.name
    );
    let _ = writeln!(
        out,
        "pub fn {decode_name}(data: &[u8]) -> Result<{value_ty}, DecodeError> {{"
    );
    let _ = writeln!(out, "    let pos = 0;");
    let _ = writeln!(out, "    let (value, _pos) = {};", decode_expr(target));
    let _ = writeln!(out, "    Ok(value)");
    let _ = writeln!(out, "}}\n");

    Ok(())
}

fn code_for_entry_encode(out: &mut String, target: &WireType, expr: &str) {
    // Entry parameters are references, so scalar primitives deref.
    out.push_str(&indent(&encode_stmt(target, expr, true), 4));
}

fn indent(block: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    block
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::from("\n")
            } else {
                format!("{pad}{line}\n")
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{build_context_for_tests, Target};
    use crate::schema::load;

    fn emit_for(src: &str) -> String {
        let schema = load(src).expect("load");
        let ctx = build_context_for_tests(&schema, Target::Rust);
        emit(&ctx).expect("emit")
    }

    #[test]
    fn test_emit_struct_message() {
        let source = emit_for(
            r#"
package demo

type Config struct {
    name  string
    value int32
}

type ConfigMessage = Config
"#,
        );
        assert!(source.contains("pub struct Config {"));
        assert!(source.contains("pub name: String,"));
        assert!(source.contains("pub value: i32,"));
        assert!(source.contains("fn encode_config(value: &Config"));
        assert!(source.contains(
            "pub fn EncodeConfigMessage(value: &Config) -> Result<Vec<u8>, EncodeError>"
        ));
        assert!(source.contains(
            "pub fn DecodeConfigMessage(data: &[u8]) -> Result<Config, DecodeError>"
        ));
    }

    #[test]
    fn test_emit_array_message_uses_element_root() {
        let source = emit_for("package demo\n\ntype IntList = []int32\n");
        assert!(source.contains("pub fn EncodeInt32Message(value: &[i32])"));
        assert!(source.contains(
            "pub fn DecodeInt32Message(data: &[u8]) -> Result<Vec<i32>, DecodeError>"
        ));
        // Bulk copy path for the fixed-width element.
        assert!(source.contains("std::ptr::copy_nonoverlapping"));
        assert!(source.contains("check_elements(data, pos, len, 4)?;"));
    }

    #[test]
    fn test_emit_optional_helper() {
        let source = emit_for("package demo\n\ntype OptInt = *int32\n");
        assert!(source.contains("fn decode_opt_int32(data: &[u8], pos: usize)"));
        assert!(source.contains("\"invalid-optional-tag\""));
        assert!(source.contains("pub fn EncodeInt32Message(value: &Option<i32>)"));
    }

    #[test]
    fn test_emit_keyword_field_escaped() {
        let source = emit_for(
            "package demo\n\ntype Record struct { match int32 }\n\ntype RecordMessage = Record\n",
        );
        assert!(source.contains("pub match_: i32,"));
    }

    #[test]
    fn test_emit_is_deterministic() {
        let src = r#"
package demo

type Inner struct {
    x int16
}

type Outer struct {
    inner Inner
    tags  []string
    note  *string
}

type OuterMessage = Outer
"#;
        assert_eq!(emit_for(src), emit_for(src));
    }

    #[test]
    fn test_emit_nested_struct_calls_helper() {
        let source = emit_for(
            r#"
package demo

type Inner struct {
    x int16
}

type Outer struct {
    inner Inner
}

type OuterMessage = Outer
"#,
        );
        assert!(source.contains("encode_inner(&value.inner, buf)?;"));
        assert!(source.contains("let (inner, pos) = decode_inner(data, pos)?;"));
    }

    #[test]
    fn test_emit_no_bulk_path_for_strings() {
        let source = emit_for("package demo\n\ntype Names = []string\n");
        assert!(source.contains("fn encode_list_string"));
        // Variable-width elements decode through the loop, with the
        // allocation clamped to the remaining bytes.
        assert!(source.contains("Vec::with_capacity(len.min(remaining))"));
    }
}
