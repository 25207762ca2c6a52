// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! TypeScript backend.
//!
//! Emits one self-contained `.ts` module: interfaces for structs, a private
//! `Writer`/`Reader` pair over `Uint8Array`/`DataView`, one helper per
//! compound type expression, and the public entry points. Decode failures
//! throw `DecodeError` (the platform's native fallible idiom); `int64` maps
//! to `bigint` to keep the full 64-bit range; `float32` widens silently to
//! `number` on decode.

use std::fmt::Write;

use heck::ToUpperCamelCase;

use crate::core::{GenerateError, Primitive};
use crate::schema::{StructDecl, WireType};

use super::naming::{decode_entry, encode_entry};
use super::{GenContext, MessageEntry};

/// Emit the complete TypeScript source for a schema.
pub fn emit(ctx: &GenContext) -> Result<String, GenerateError> {
    let mut decls = String::new();
    let mut helpers = HelperSet::default();
    let mut api = String::new();

    for decl in &ctx.schema.structs {
        emit_interface(&mut decls, decl);
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
    let _ = writeln!(
        out,
        "// float32 values widen to number (double) on decode."
    );
    out.push('\n');
    out.push_str(PRELUDE);
    out.push('\n');
    out.push_str(&decls);
    out.push_str(&helpers.code);
    out.push_str(&api);
    Ok(out)
}

const PRELUDE: &str = r#"export class DecodeError extends Error {
  constructor(
    public readonly code: string,
    public readonly position: number,
    message: string,
  ) {
    super(`${code} at position ${position}: ${message}`);
    this.name = "DecodeError";
  }
}

export class EncodeError extends Error {
  constructor(
    public readonly code: string,
    message: string,
  ) {
    super(`${code}: ${message}`);
    this.name = "EncodeError";
  }
}

const textEncoder = new TextEncoder();
const textDecoder = new TextDecoder("utf-8", { fatal: true });

class Writer {
  buf: Uint8Array;
  view: DataView;
  len: number;

  constructor(capacity: number) {
    this.buf = new Uint8Array(capacity < 16 ? 16 : capacity);
    this.view = new DataView(this.buf.buffer);
    this.len = 0;
  }

  ensure(extra: number): void {
    if (this.len + extra <= this.buf.length) {
      return;
    }
    let next = this.buf.length * 2;
    while (next < this.len + extra) {
      next *= 2;
    }
    const grown = new Uint8Array(next);
    grown.set(this.buf.subarray(0, this.len));
    this.buf = grown;
    this.view = new DataView(grown.buffer);
  }

  finish(): Uint8Array {
    return this.buf.slice(0, this.len);
  }
}

function writeU8(w: Writer, v: number): void {
  w.ensure(1);
  w.buf[w.len] = v & 0xff;
  w.len += 1;
}

function writeBool(w: Writer, v: boolean): void {
  writeU8(w, v ? 1 : 0);
}

function writeU16(w: Writer, v: number): void {
  w.ensure(2);
  w.buf[w.len] = v & 0xff;
  w.buf[w.len + 1] = (v >> 8) & 0xff;
  w.len += 2;
}

function writeI16(w: Writer, v: number): void {
  writeU16(w, v & 0xffff);
}

function writeI32(w: Writer, v: number): void {
  w.ensure(4);
  w.buf[w.len] = v & 0xff;
  w.buf[w.len + 1] = (v >> 8) & 0xff;
  w.buf[w.len + 2] = (v >> 16) & 0xff;
  w.buf[w.len + 3] = (v >> 24) & 0xff;
  w.len += 4;
}

function writeI64(w: Writer, v: bigint): void {
  w.ensure(8);
  w.view.setBigInt64(w.len, v, true);
  w.len += 8;
}

function writeF32(w: Writer, v: number): void {
  w.ensure(4);
  w.view.setFloat32(w.len, v, true);
  w.len += 4;
}

function writeF64(w: Writer, v: number): void {
  w.ensure(8);
  w.view.setFloat64(w.len, v, true);
  w.len += 8;
}

function writeString(w: Writer, v: string): void {
  const bytes = textEncoder.encode(v);
  if (bytes.length > 65535) {
    throw new EncodeError(
      "string-too-long",
      `string of ${bytes.length} bytes exceeds 65535`,
    );
  }
  writeU16(w, bytes.length);
  w.ensure(bytes.length);
  w.buf.set(bytes, w.len);
  w.len += bytes.length;
}

class Reader {
  readonly data: Uint8Array;
  readonly view: DataView;
  pos: number;

  constructor(data: Uint8Array) {
    this.data = data;
    this.view = new DataView(data.buffer, data.byteOffset, data.byteLength);
    this.pos = 0;
  }

  remaining(): number {
    return this.data.length - this.pos;
  }

  check(needed: number): void {
    if (this.remaining() < needed) {
      throw new DecodeError(
        "insufficient-data",
        this.pos,
        `needed ${needed} bytes, have ${this.remaining()}`,
      );
    }
  }

  checkElements(len: number, width: number): void {
    const total = len * width;
    if (total <= this.remaining()) {
      return;
    }
    const whole = Math.floor(this.remaining() / width);
    throw new DecodeError(
      "insufficient-data",
      this.pos + whole * width,
      `needed ${width} bytes, have ${this.remaining() - whole * width}`,
    );
  }

  u8(): number {
    this.check(1);
    const v = this.data[this.pos];
    this.pos += 1;
    return v;
  }

  bool(): boolean {
    return this.u8() !== 0;
  }

  presence(): boolean {
    const at = this.pos;
    const tag = this.u8();
    if (tag === 0) {
      return false;
    }
    if (tag === 1) {
      return true;
    }
    throw new DecodeError(
      "invalid-optional-tag",
      at,
      `invalid optional tag 0x${tag.toString(16).padStart(2, "0")}`,
    );
  }

  i8(): number {
    this.check(1);
    const v = this.view.getInt8(this.pos);
    this.pos += 1;
    return v;
  }

  u16(): number {
    this.check(2);
    const v = this.data[this.pos] | (this.data[this.pos + 1] << 8);
    this.pos += 2;
    return v;
  }

  i16(): number {
    this.check(2);
    const v = this.view.getInt16(this.pos, true);
    this.pos += 2;
    return v;
  }

  i32(): number {
    this.check(4);
    const v = this.view.getInt32(this.pos, true);
    this.pos += 4;
    return v;
  }

  i64(): bigint {
    this.check(8);
    const v = this.view.getBigInt64(this.pos, true);
    this.pos += 8;
    return v;
  }

  f32(): number {
    this.check(4);
    const v = this.view.getFloat32(this.pos, true);
    this.pos += 4;
    return v;
  }

  f64(): number {
    this.check(8);
    const v = this.view.getFloat64(this.pos, true);
    this.pos += 8;
    return v;
  }

  string(): string {
    const len = this.u16();
    this.check(len);
    const at = this.pos;
    const bytes = this.data.subarray(this.pos, this.pos + len);
    this.pos += len;
    try {
      return textDecoder.decode(bytes);
    } catch {
      throw new DecodeError("invalid-utf8", at, "string content is not valid UTF-8");
    }
  }
}
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

/// The TypeScript type for a type expression.
fn ts_type(ty: &WireType) -> String {
    let base = match ty {
        WireType::Primitive { prim, .. } => match prim {
            Primitive::Bool => "boolean".to_string(),
            Primitive::Int64 => "bigint".to_string(),
            Primitive::String => "string".to_string(),
            _ => "number".to_string(),
        },
        WireType::Array { elem, .. } => {
            let inner = ts_type(elem);
            if inner.contains('|') {
                format!("({inner})[]")
            } else {
                format!("{inner}[]")
            }
        }
        WireType::Named { name, .. } => name.clone(),
    };
    if ty.is_optional() {
        format!("{base} | null")
    } else {
        base
    }
}

/// CamelCase mangled name for a type expression, used in helper names.
fn mangle(ty: &WireType) -> String {
    if ty.is_optional() {
        return format!("Opt{}", mangle(&non_optional(ty)));
    }
    match ty {
        WireType::Primitive { prim, .. } => prim.name().to_upper_camel_case(),
        WireType::Array { elem, .. } => format!("List{}", mangle(elem)),
        WireType::Named { name, .. } => name.clone(),
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

fn emit_interface(out: &mut String, decl: &StructDecl) {
    let _ = writeln!(out, "export interface {} {{", decl.name);
    for field in &decl.fields {
        let _ = writeln!(out, "  {}: {};", field.name, ts_type(&field.ty));
    }
    let _ = writeln!(out, "}}\n");
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

    let mut code = String::new();
    let _ = writeln!(
        code,
        "function encode{}(value: {}, w: Writer): void {{",
        decl.name, decl.name
    );
    for field in &decl.fields {
        code.push_str(&indent(
            &encode_stmt(&field.ty, &format!("value.{}", field.name)),
            2,
        ));
    }
    let _ = writeln!(code, "}}\n");

    let _ = writeln!(
        code,
        "function decode{}(r: Reader): {} {{",
        decl.name, decl.name
    );
    let _ = writeln!(code, "  return {{");
    for field in &decl.fields {
        let _ = writeln!(code, "    {}: {},", field.name, decode_expr(&field.ty));
    }
    let _ = writeln!(code, "  }};");
    let _ = writeln!(code, "}}\n");

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
    let inner_ty = ts_type(inner);
    let mut code = String::new();

    let _ = writeln!(
        code,
        "function encode{name}(value: {inner_ty} | null, w: Writer): void {{"
    );
    let _ = writeln!(code, "  if (value === null) {{");
    let _ = writeln!(code, "    writeU8(w, 0);");
    let _ = writeln!(code, "    return;");
    let _ = writeln!(code, "  }}");
    let _ = writeln!(code, "  writeU8(w, 1);");
    code.push_str(&indent(&encode_stmt(inner, "value"), 2));
    let _ = writeln!(code, "}}\n");

    let _ = writeln!(
        code,
        "function decode{name}(r: Reader): {inner_ty} | null {{"
    );
    let _ = writeln!(code, "  if (!r.presence()) {{");
    let _ = writeln!(code, "    return null;");
    let _ = writeln!(code, "  }}");
    let _ = writeln!(code, "  return {};", decode_expr(inner));
    let _ = writeln!(code, "}}\n");

    helpers.insert(name, code);
}

fn emit_array_helper(helpers: &mut HelperSet, ty: &WireType, elem: &WireType) {
    let name = mangle(ty);
    if helpers.contains(&name) {
        return;
    }
    let elem_ty = ts_type(elem);
    let array_ty = ts_type(ty);
    let mut code = String::new();

    let _ = writeln!(
        code,
        "function encode{name}(value: {array_ty}, w: Writer): void {{"
    );
    let _ = writeln!(code, "  if (value.length > 65535) {{");
    let _ = writeln!(
        code,
        "    throw new EncodeError(\"array-too-long\", `array of ${{value.length}} elements exceeds 65535`);"
    );
    let _ = writeln!(code, "  }}");
    let _ = writeln!(code, "  writeU16(w, value.length);");
    let _ = writeln!(code, "  for (const item of value) {{");
    code.push_str(&indent(&encode_stmt(elem, "item"), 4));
    let _ = writeln!(code, "  }}");
    let _ = writeln!(code, "}}\n");

    let _ = writeln!(code, "function decode{name}(r: Reader): {array_ty} {{");
    let _ = writeln!(code, "  const len = r.u16();");
    if let Some(width) = fixed_width(elem) {
        let _ = writeln!(code, "  r.checkElements(len, {width});");
    }
    let _ = writeln!(code, "  const out: {elem_ty}[] = [];");
    let _ = writeln!(code, "  for (let i = 0; i < len; i += 1) {{");
    let _ = writeln!(code, "    out.push({});", decode_expr(elem));
    let _ = writeln!(code, "  }}");
    let _ = writeln!(code, "  return out;");
    let _ = writeln!(code, "}}\n");

    helpers.insert(name, code);
}

fn fixed_width(elem: &WireType) -> Option<usize> {
    match elem {
        WireType::Primitive {
            prim,
            optional: false,
        } => prim.size(),
        _ => None,
    }
}

fn encode_stmt(ty: &WireType, expr: &str) -> String {
    if ty.is_optional() {
        return format!("encode{}({expr}, w);\n", mangle(ty));
    }
    match ty {
        WireType::Primitive { prim, .. } => {
            let writer = match prim {
                Primitive::Bool => "writeBool",
                Primitive::Int8 => "writeU8",
                Primitive::Int16 => "writeI16",
                Primitive::Int32 => "writeI32",
                Primitive::Int64 => "writeI64",
                Primitive::Float32 => "writeF32",
                Primitive::Float64 => "writeF64",
                Primitive::String => "writeString",
            };
            format!("{writer}(w, {expr});\n")
        }
        WireType::Array { .. } | WireType::Named { .. } => {
            format!("encode{}({expr}, w);\n", mangle(ty))
        }
    }
}

fn decode_expr(ty: &WireType) -> String {
    if ty.is_optional() {
        return format!("decode{}(r)", mangle(ty));
    }
    match ty {
        WireType::Primitive { prim, .. } => {
            let reader = match prim {
                Primitive::Bool => "bool",
                Primitive::Int8 => "i8",
                Primitive::Int16 => "i16",
                Primitive::Int32 => "i32",
                Primitive::Int64 => "i64",
                Primitive::Float32 => "f32",
                Primitive::Float64 => "f64",
                Primitive::String => "string",
            };
            format!("r.{reader}()")
        }
        WireType::Array { .. } | WireType::Named { .. } => format!("decode{}(r)", mangle(ty)),
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

    let value_ty = ts_type(target);
    let capacity = ctx.capacity_hint(&entry.message.name);
    let encode_name = encode_entry(&entry.root);
    let decode_name = decode_entry(&entry.root);

    let _ = writeln!(
        out,
        "/** Encode a `{}` message into wire-format bytes. */",
        entry.message.name
    );
    let _ = writeln!(
        out,
        "export function {encode_name}(value: {value_ty}): Uint8Array {{"
    );
    let _ = writeln!(out, "  const w = new Writer({capacity});");
    out.push_str(&indent(&encode_stmt(target, "value"), 2));
    let _ = writeln!(out, "  return w.finish();");
    let _ = writeln!(out, "}}\n");

    let _ = writeln!(
        out,
        "/** Decode a `{}` message from wire-format bytes. */",
        entry.message.name
    );
    let _ = writeln!(
        out,
        "export function {decode_name}(data: Uint8Array): {value_ty} {{"
    );
    let _ = writeln!(out, "  const r = new Reader(data);");
    let _ = writeln!(out, "  return {};", decode_expr(target));
    let _ = writeln!(out, "}}\n");

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
        let ctx = build_context_for_tests(&schema, Target::TypeScript);
        emit(&ctx).expect("emit")
    }

    #[test]
    fn test_emit_interface_and_entries() {
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
        assert!(source.contains("export interface Config {"));
        assert!(source.contains("name: string;"));
        assert!(source.contains("value: number;"));
        assert!(source.contains("export function EncodeConfigMessage(value: Config): Uint8Array"));
        assert!(source.contains("export function DecodeConfigMessage(data: Uint8Array): Config"));
    }

    #[test]
    fn test_emit_int64_maps_to_bigint() {
        let source = emit_for(
            "package demo\n\ntype Counter struct { value int64 }\n\ntype CounterMessage = Counter\n",
        );
        assert!(source.contains("value: bigint;"));
        assert!(source.contains("writeI64(w, value.value);"));
    }

    #[test]
    fn test_emit_optional_maps_to_null_union() {
        let source = emit_for("package demo\n\ntype OptInt = *int32\n");
        assert!(source.contains("export function EncodeInt32Message(value: number | null)"));
        assert!(source.contains("function decodeOptInt32(r: Reader): number | null"));
        assert!(source.contains("invalid-optional-tag"));
    }

    #[test]
    fn test_emit_array_pre_checks_fixed_elements() {
        let source = emit_for("package demo\n\ntype IntList = []int32\n");
        assert!(source.contains("r.checkElements(len, 4);"));
        assert!(source.contains("export function EncodeInt32Message(value: number[])"));
    }

    #[test]
    fn test_emit_nested_optional_array_type() {
        let source = emit_for("package demo\n\ntype Sparse = []*string\n");
        assert!(source.contains("(string | null)[]"));
        assert!(source.contains("function encodeListOptString"));
    }

    #[test]
    fn test_emit_is_deterministic() {
        let src = "package demo\n\ntype A struct { x []float64\n y *bool }\n\ntype AMessage = A\n";
        assert_eq!(emit_for(src), emit_for(src));
    }
}
