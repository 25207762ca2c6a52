// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Python backend.
//!
//! Emits one self-contained `.py` module: a dataclass per struct, private
//! read/write helpers, one helper per compound type expression, and the
//! public entry points. Integers are range-checked on encode (Python ints
//! are unbounded, so the fixed-width ceilings must be enforced explicitly);
//! floats go through `struct.pack`/`unpack_from` for the IEEE 754
//! reinterpretation; `float32` widens silently to Python float on decode.
//! Arrays of fixed-width primitives encode and decode through one
//! `struct` call instead of an element loop.

use std::fmt::Write;

use heck::ToSnakeCase;

use crate::core::{GenerateError, Primitive};
use crate::schema::{StructDecl, WireType};

use super::naming::{decode_entry, encode_entry, escape_keyword};
use super::{GenContext, MessageEntry};

/// Python keywords that need escaping when used as field names.
const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue",
    "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if", "import",
    "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while",
    "with", "yield",
];

/// Emit the complete Python source for a schema.
pub fn emit(ctx: &GenContext) -> Result<String, GenerateError> {
    let mut decls = String::new();
    let mut helpers = HelperSet::default();
    let mut api = String::new();

    for decl in &ctx.schema.structs {
        emit_dataclass(&mut decls, decl);
        emit_struct_helpers(ctx, &mut helpers, decl)?;
    }
    for entry in &ctx.entries {
        emit_entry(ctx, &mut helpers, &mut api, entry)?;
    }

    let mut out = String::new();
    let _ = writeln!(out, "# Code generated by fastwire. DO NOT EDIT.");
    let _ = writeln!(out, "# package: {}", ctx.package);
    let _ = writeln!(out, "#");
    let _ = writeln!(
        out,
        "# Wire format: little-endian, uint16 length prefixes, one-byte"
    );
    let _ = writeln!(
        out,
        "# presence flags, struct fields in declaration order, no padding."
    );
    let _ = writeln!(out, "# float32 values widen to Python float on decode.");
    out.push('\n');
    out.push_str(PRELUDE);
    out.push('\n');
    out.push_str(&decls);
    out.push_str(&helpers.code);
    out.push_str(&api);
    Ok(out)
}

const PRELUDE: &str = r#"from __future__ import annotations

import math
import struct
from dataclasses import dataclass
from typing import List, Optional

_FLOAT32_MAX = 3.4028234663852886e38


class DecodeError(Exception):
    """Structured decode failure; `code` is stable across backends."""

    def __init__(self, code: str, position: int, message: str) -> None:
        super().__init__(f"{code} at position {position}: {message}")
        self.code = code
        self.position = position


class EncodeError(Exception):
    """Structured encode failure (range and length ceiling violations)."""

    def __init__(self, code: str, message: str) -> None:
        super().__init__(f"{code}: {message}")
        self.code = code


def _insufficient(pos: int, needed: int, have: int) -> DecodeError:
    return DecodeError("insufficient-data", pos, f"needed {needed} bytes, have {have}")


def _check_elements(data: bytes, pos: int, length: int, width: int) -> None:
    remaining = max(0, len(data) - pos)
    if length * width <= remaining:
        return
    whole = remaining // width
    raise _insufficient(pos + whole * width, width, remaining - whole * width)


def _write_u16(buf: bytearray, v: int) -> None:
    buf.append(v & 0xFF)
    buf.append((v >> 8) & 0xFF)


def _write_bool(buf: bytearray, v: bool) -> None:
    buf.append(1 if v else 0)


def _write_i8(buf: bytearray, v: int) -> None:
    if v < -128 or v > 127:
        raise EncodeError("int8-out-of-range", f"value {v} out of range for int8")
    buf.append(v & 0xFF)


def _write_i16(buf: bytearray, v: int) -> None:
    if v < -32768 or v > 32767:
        raise EncodeError("int16-out-of-range", f"value {v} out of range for int16")
    buf.append(v & 0xFF)
    buf.append((v >> 8) & 0xFF)


def _write_i32(buf: bytearray, v: int) -> None:
    if v < -(1 << 31) or v > (1 << 31) - 1:
        raise EncodeError("int32-out-of-range", f"value {v} out of range for int32")
    u = v & 0xFFFFFFFF
    buf.append(u & 0xFF)
    buf.append((u >> 8) & 0xFF)
    buf.append((u >> 16) & 0xFF)
    buf.append((u >> 24) & 0xFF)


def _write_i64(buf: bytearray, v: int) -> None:
    if v < -(1 << 63) or v > (1 << 63) - 1:
        raise EncodeError("int64-out-of-range", f"value {v} out of range for int64")
    u = v & 0xFFFFFFFFFFFFFFFF
    for shift in (0, 8, 16, 24, 32, 40, 48, 56):
        buf.append((u >> shift) & 0xFF)


def _write_f32(buf: bytearray, v: float) -> None:
    if math.isfinite(v) and abs(v) > _FLOAT32_MAX:
        raise EncodeError("float32-out-of-range", f"value {v} out of range for float32")
    buf += struct.pack("<f", v)


def _write_f64(buf: bytearray, v: float) -> None:
    buf += struct.pack("<d", v)


def _write_string(buf: bytearray, v: str) -> None:
    encoded = v.encode("utf-8")
    if len(encoded) > 65535:
        raise EncodeError(
            "string-too-long", f"string of {len(encoded)} bytes exceeds 65535"
        )
    _write_u16(buf, len(encoded))
    buf += encoded


def _read_u8(data: bytes, pos: int) -> tuple:
    if pos >= len(data):
        raise _insufficient(pos, 1, 0)
    return data[pos], pos + 1


def _read_bool(data: bytes, pos: int) -> tuple:
    v, pos = _read_u8(data, pos)
    return v != 0, pos


def _read_presence(data: bytes, pos: int) -> tuple:
    at = pos
    v, pos = _read_u8(data, pos)
    if v == 0:
        return False, pos
    if v == 1:
        return True, pos
    raise DecodeError(
        "invalid-optional-tag", at, f"invalid optional tag 0x{v:02X}"
    )


def _read_u16(data: bytes, pos: int) -> tuple:
    if pos + 2 > len(data):
        raise _insufficient(pos, 2, max(0, len(data) - pos))
    return data[pos] | (data[pos + 1] << 8), pos + 2


def _read_i8(data: bytes, pos: int) -> tuple:
    v, pos = _read_u8(data, pos)
    return v - 256 if v >= 128 else v, pos


def _read_i16(data: bytes, pos: int) -> tuple:
    v, pos = _read_u16(data, pos)
    return v - 65536 if v >= 32768 else v, pos


def _read_i32(data: bytes, pos: int) -> tuple:
    if pos + 4 > len(data):
        raise _insufficient(pos, 4, max(0, len(data) - pos))
    v = int.from_bytes(data[pos : pos + 4], "little", signed=True)
    return v, pos + 4


def _read_i64(data: bytes, pos: int) -> tuple:
    if pos + 8 > len(data):
        raise _insufficient(pos, 8, max(0, len(data) - pos))
    v = int.from_bytes(data[pos : pos + 8], "little", signed=True)
    return v, pos + 8


def _read_f32(data: bytes, pos: int) -> tuple:
    if pos + 4 > len(data):
        raise _insufficient(pos, 4, max(0, len(data) - pos))
    return struct.unpack_from("<f", data, pos)[0], pos + 4


def _read_f64(data: bytes, pos: int) -> tuple:
    if pos + 8 > len(data):
        raise _insufficient(pos, 8, max(0, len(data) - pos))
    return struct.unpack_from("<d", data, pos)[0], pos + 8


def _read_string(data: bytes, pos: int) -> tuple:
    length, pos = _read_u16(data, pos)
    if pos + length > len(data):
        raise _insufficient(pos, length, max(0, len(data) - pos))
    try:
        return data[pos : pos + length].decode("utf-8"), pos + length
    except UnicodeDecodeError:
        raise DecodeError(
            "invalid-utf8", pos, "string content is not valid UTF-8"
        ) from None
"#;

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

/// The Python annotation for a type expression.
fn py_type(ty: &WireType) -> String {
    let base = match ty {
        WireType::Primitive { prim, .. } => match prim {
            Primitive::Bool => "bool".to_string(),
            Primitive::Float32 | Primitive::Float64 => "float".to_string(),
            Primitive::String => "str".to_string(),
            _ => "int".to_string(),
        },
        WireType::Array { elem, .. } => format!("List[{}]", py_type(elem)),
        WireType::Named { name, .. } => name.clone(),
    };
    if ty.is_optional() {
        format!("Optional[{base}]")
    } else {
        base
    }
}

/// snake_case mangled name for a type expression, used in helper names.
fn mangle(ty: &WireType) -> String {
    if ty.is_optional() {
        return format!("opt_{}", mangle(&non_optional(ty)));
    }
    match ty {
        WireType::Primitive { prim, .. } => prim.name().to_string(),
        WireType::Array { elem, .. } => format!("list_{}", mangle(elem)),
        WireType::Named { name, .. } => name.to_snake_case(),
    }
}

fn non_optional(ty: &WireType) -> WireType {
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

fn emit_dataclass(out: &mut String, decl: &StructDecl) {
    let _ = writeln!(out, "@dataclass");
    let _ = writeln!(out, "class {}:", decl.name);
    for field in &decl.fields {
        let _ = writeln!(
            out,
            "    {}: {}",
            escape_keyword(&field.name, KEYWORDS),
            py_type(&field.ty)
        );
    }
    out.push_str("\n\n");
}

fn emit_struct_helpers(
    ctx: &GenContext,
    helpers: &mut HelperSet,
    decl: &StructDecl,
) -> Result<(), GenerateError> {
    for field in &decl.fields {
        ensure_type_helpers(ctx, helpers, &field.ty)?;
    }

    let marker = format!("struct:{}", decl.name);
    if helpers.contains(&marker) {
        return Ok(());
    }

    let snake = decl.name.to_snake_case();
    let mut code = String::new();

    let _ = writeln!(
        code,
        "def _encode_{snake}(value: {}, buf: bytearray) -> None:",
        decl.name
    );
    for field in &decl.fields {
        let access = format!("value.{}", escape_keyword(&field.name, KEYWORDS));
        code.push_str(&indent(&encode_stmt(&field.ty, &access), 4));
    }
    code.push_str("\n\n");

    let _ = writeln!(
        code,
        "def _decode_{snake}(data: bytes, pos: int) -> tuple:"
    );
    for field in &decl.fields {
        let var = escape_keyword(&field.name, KEYWORDS);
        let _ = writeln!(code, "    {var}, pos = {}", decode_expr(&field.ty));
    }
    let _ = writeln!(
        code,
        "    return {}({}), pos",
        decl.name,
        decl.fields
            .iter()
            .map(|f| escape_keyword(&f.name, KEYWORDS))
            .collect::<Vec<_>>()
            .join(", ")
    );
    code.push_str("\n\n");

    helpers.insert(marker, code);
    Ok(())
}

fn ensure_type_helpers(
    ctx: &GenContext,
    helpers: &mut HelperSet,
    ty: &WireType,
) -> Result<(), GenerateError> {
    if ty.is_optional() {
        let inner = non_optional(ty);
        ensure_type_helpers(ctx, helpers, &inner)?;
        emit_optional_helper(helpers, ty, &inner);
        return Ok(());
    }
    match ty {
        WireType::Primitive { .. } | WireType::Named { .. } => Ok(()),
        WireType::Array { elem, .. } => {
            ensure_type_helpers(ctx, helpers, elem)?;
            emit_array_helper(helpers, ty, elem);
            Ok(())
        }
    }
}

fn emit_optional_helper(helpers: &mut HelperSet, ty: &WireType, inner: &WireType) {
    let name = mangle(ty);
    if helpers.contains(&name) {
        return;
    }
    let inner_ty = py_type(inner);
    let mut code = String::new();

    let _ = writeln!(
        code,
        "def _encode_{name}(value: Optional[{inner_ty}], buf: bytearray) -> None:"
    );
    let _ = writeln!(code, "    if value is None:");
    let _ = writeln!(code, "        buf.append(0)");
    let _ = writeln!(code, "        return");
    let _ = writeln!(code, "    buf.append(1)");
    code.push_str(&indent(&encode_stmt(inner, "value"), 4));
    code.push_str("\n\n");

    let _ = writeln!(code, "def _decode_{name}(data: bytes, pos: int) -> tuple:");
    let _ = writeln!(code, "    present, pos = _read_presence(data, pos)");
    let _ = writeln!(code, "    if not present:");
    let _ = writeln!(code, "        return None, pos");
    let _ = writeln!(code, "    value, pos = {}", decode_expr(inner));
    let _ = writeln!(code, "    return value, pos");
    code.push_str("\n\n");

    helpers.insert(name, code);
}

fn emit_array_helper(helpers: &mut HelperSet, ty: &WireType, elem: &WireType) {
    let name = mangle(ty);
    if helpers.contains(&name) {
        return;
    }
    let array_ty = py_type(ty);
    let mut code = String::new();

    let _ = writeln!(
        code,
        "def _encode_{name}(value: {array_ty}, buf: bytearray) -> None:"
    );
    let _ = writeln!(code, "    if len(value) > 65535:");
    let _ = writeln!(
        code,
        "        raise EncodeError(\"array-too-long\", f\"array of {{len(value)}} elements exceeds 65535\")"
    );
    let _ = writeln!(code, "    _write_u16(buf, len(value))");
    if let Some((fmt, range_code)) = bulk_format(elem) {
        // One struct.pack call for the whole array; range failures surface
        // as the same structured error the scalar writers raise.
        let _ = writeln!(code, "    try:");
        let _ = writeln!(
            code,
            "        buf += struct.pack(f\"<{{len(value)}}{fmt}\", *value)"
        );
        let _ = writeln!(code, "    except (struct.error, OverflowError):");
        let _ = writeln!(code, "        for item in value:");
        code.push_str(&indent(&encode_stmt(elem, "item"), 12));
        let _ = writeln!(
            code,
            "        raise EncodeError(\"{range_code}\", \"array element out of range\")"
        );
    } else {
        let _ = writeln!(code, "    for item in value:");
        code.push_str(&indent(&encode_stmt(elem, "item"), 8));
    }
    code.push_str("\n\n");

    let _ = writeln!(code, "def _decode_{name}(data: bytes, pos: int) -> tuple:");
    let _ = writeln!(code, "    length, pos = _read_u16(data, pos)");
    if let Some((fmt, _)) = bulk_format(elem) {
        let width = fixed_width(elem).unwrap_or(1);
        let _ = writeln!(code, "    _check_elements(data, pos, length, {width})");
        let _ = writeln!(
            code,
            "    out = list(struct.unpack_from(f\"<{{length}}{fmt}\", data, pos))"
        );
        let _ = writeln!(code, "    return out, pos + length * {width}");
    } else {
        let _ = writeln!(code, "    out = []");
        let _ = writeln!(code, "    for _ in range(length):");
        let _ = writeln!(code, "        item, pos = {}", decode_expr(elem));
        let _ = writeln!(code, "        out.append(item)");
        let _ = writeln!(code, "    return out, pos");
    }
    code.push_str("\n\n");

    helpers.insert(name, code);
}

/// `struct` format char and range-error code for bulk-capable elements.
fn bulk_format(elem: &WireType) -> Option<(&'static str, &'static str)> {
    match elem {
        WireType::Primitive {
            prim,
            optional: false,
        } => match prim {
            Primitive::Int16 => Some(("h", "int16-out-of-range")),
            Primitive::Int32 => Some(("i", "int32-out-of-range")),
            Primitive::Int64 => Some(("q", "int64-out-of-range")),
            Primitive::Float32 => Some(("f", "float32-out-of-range")),
            Primitive::Float64 => Some(("d", "float64-out-of-range")),
            _ => None,
        },
        _ => None,
    }
}

fn fixed_width(elem: &WireType) -> Option<usize> {
    match elem {
        WireType::Primitive { prim, .. } => prim.size(),
        _ => None,
    }
}

fn encode_stmt(ty: &WireType, expr: &str) -> String {
    if ty.is_optional() {
        return format!("_encode_{}({expr}, buf)\n", mangle(ty));
    }
    match ty {
        WireType::Primitive { prim, .. } => {
            let writer = match prim {
                Primitive::Bool => "_write_bool",
                Primitive::Int8 => "_write_i8",
                Primitive::Int16 => "_write_i16",
                Primitive::Int32 => "_write_i32",
                Primitive::Int64 => "_write_i64",
                Primitive::Float32 => "_write_f32",
                Primitive::Float64 => "_write_f64",
                Primitive::String => "_write_string",
            };
            format!("{writer}(buf, {expr})\n")
        }
        WireType::Array { .. } | WireType::Named { .. } => {
            format!("_encode_{}({expr}, buf)\n", mangle(ty))
        }
    }
}

fn decode_expr(ty: &WireType) -> String {
    if ty.is_optional() {
        return format!("_decode_{}(data, pos)", mangle(ty));
    }
    match ty {
        WireType::Primitive { prim, .. } => {
            let reader = match prim {
                Primitive::Bool => "_read_bool",
                Primitive::Int8 => "_read_i8",
                Primitive::Int16 => "_read_i16",
                Primitive::Int32 => "_read_i32",
                Primitive::Int64 => "_read_i64",
                Primitive::Float32 => "_read_f32",
                Primitive::Float64 => "_read_f64",
                Primitive::String => "_read_string",
            };
            format!("{reader}(data, pos)")
        }
        WireType::Array { .. } | WireType::Named { .. } => {
            format!("_decode_{}(data, pos)", mangle(ty))
        }
    }
}

fn emit_entry(
    ctx: &GenContext,
    helpers: &mut HelperSet,
    out: &mut String,
    entry: &MessageEntry,
) -> Result<(), GenerateError> {
    let target = &entry.message.target;
    ensure_type_helpers(ctx, helpers, target)?;

    let value_ty = py_type(target);
    let encode_name = encode_entry(&entry.root);
    let decode_name = decode_entry(&entry.root);

    let _ = writeln!(out, "def {encode_name}(value: {value_ty}) -> bytes:");
    let _ = writeln!(
        out,
        "    \"\"\"Encode a `{}` message into wire-format bytes.\"\"\"",
        entry.message.name
    );
    let _ = writeln!(out, "    buf = bytearray()");
    out.push_str(&indent(&encode_stmt(target, "value"), 4));
    let _ = writeln!(out, "    return bytes(buf)");
    out.push_str("\n\n");

    let _ = writeln!(out, "def {decode_name}(data: bytes) -> {value_ty}:");
    let _ = writeln!(
        out,
        "    \"\"\"Decode a `{}` message from wire-format bytes.\"\"\"",
        entry.message.name
    );
    let _ = writeln!(out, "    pos = 0");
    let _ = writeln!(out, "    value, pos = {}", decode_expr(target));
    let _ = writeln!(out, "    return value");
    out.push_str("\n\n");

    Ok(())
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
        let ctx = build_context_for_tests(&schema, Target::Python);
        emit(&ctx).expect("emit")
    }

    #[test]
    fn test_emit_dataclass_and_entries() {
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
        assert!(source.contains("@dataclass"));
        assert!(source.contains("class Config:"));
        assert!(source.contains("    name: str"));
        assert!(source.contains("    value: int"));
        assert!(source.contains("def EncodeConfigMessage(value: Config) -> bytes:"));
        assert!(source.contains("def DecodeConfigMessage(data: bytes) -> Config:"));
    }

    #[test]
    fn test_emit_int_range_checks() {
        let source = emit_for("package demo\n\ntype Tiny = int8\n");
        assert!(source.contains("int8-out-of-range"));
        assert!(source.contains("def EncodeInt8Message(value: int) -> bytes:"));
    }

    #[test]
    fn test_emit_optional_maps_to_none() {
        let source = emit_for("package demo\n\ntype OptInt = *int32\n");
        assert!(source.contains("def _decode_opt_int32(data: bytes, pos: int) -> tuple:"));
        assert!(source.contains("return None, pos"));
        assert!(source.contains("Optional[int]"));
    }

    #[test]
    fn test_emit_bulk_array_uses_struct_pack() {
        let source = emit_for("package demo\n\ntype Samples = []float64\n");
        assert!(source.contains("struct.unpack_from(f\"<{length}d\", data, pos)"));
        assert!(source.contains("_check_elements(data, pos, length, 8)"));
    }

    #[test]
    fn test_emit_keyword_field_escaped() {
        let source = emit_for(
            "package demo\n\ntype Record struct { class int32 }\n\ntype RecordMessage = Record\n",
        );
        assert!(source.contains("    class_: int"));
    }

    #[test]
    fn test_emit_is_deterministic() {
        let src = "package demo\n\ntype A struct { x []int16\n y *string }\n\ntype AMessage = A\n";
        assert_eq!(emit_for(src), emit_for(src));
    }
}
