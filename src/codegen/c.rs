// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! C backend.
//!
//! Emits one self-contained `.c` file: typedefs in dependency order (C needs
//! by-value members declared first), a growable buffer writer, positioned
//! readers, one helper per compound type expression, free functions for
//! decoded values, and the public entry points.
//!
//! Conventions of the emitted code:
//! - every fallible call is wrapped in the `FW_TRY` status macro;
//! - strings are `FwString` (`malloc`ed, NUL-terminated for convenience,
//!   length-counted for embedded NULs);
//! - arrays are `{items, len}` pairs with `calloc`ed storage, so a decode
//!   failure leaves a value that is always safe to pass to its free
//!   function;
//! - `Decode*Message` zeroes the out-value, and frees it again on failure;
//! - float bits move through `memcpy`, never type-punned unions;
//! - on little-endian hosts, arrays of fixed-width primitives encode and
//!   decode with a single `memcpy`.

use std::fmt::Write;

use heck::{ToSnakeCase, ToUpperCamelCase};

use crate::core::{GenerateError, Primitive};
use crate::schema::{StructDecl, WireType};

use super::naming::{decode_entry, encode_entry, escape_keyword};
use super::{GenContext, MessageEntry};

/// C keywords that need escaping when used as field names.
const KEYWORDS: &[&str] = &[
    "auto", "bool", "break", "case", "char", "const", "continue", "default", "do", "double",
    "else", "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while",
];

/// Emit the complete C source for a schema.
pub fn emit(ctx: &GenContext) -> Result<String, GenerateError> {
    let mut emitter = Emitter {
        ctx,
        typedefs: NamedSet::default(),
        helpers: NamedSet::default(),
        visiting: Vec::new(),
        api: String::new(),
    };

    for decl in &ctx.schema.structs {
        emitter.ensure_struct(decl)?;
    }
    for entry in &ctx.entries {
        emitter.emit_entry(entry)?;
    }

    let mut out = String::new();
    let _ = writeln!(out, "/* Code generated by fastwire. DO NOT EDIT. */");
    let _ = writeln!(out, "/* package: {} */", ctx.package);
    let _ = writeln!(out, "/*");
    let _ = writeln!(
        out,
        " * Wire format: little-endian, uint16 length prefixes, one-byte"
    );
    let _ = writeln!(
        out,
        " * presence flags, struct fields in declaration order, no padding."
    );
    let _ = writeln!(
        out,
        " * Decoded values own their memory; pass them to the matching"
    );
    let _ = writeln!(out, " * Free*Message function when done.");
    let _ = writeln!(out, " */");
    out.push('\n');
    out.push_str(PRELUDE);
    out.push('\n');
    out.push_str(&emitter.typedefs.code);
    out.push_str(&emitter.helpers.code);
    out.push_str(&emitter.api);
    Ok(out)
}

const PRELUDE: &str = r#"#include <stdbool.h>
#include <stddef.h>
#include <stdint.h>
#include <stdlib.h>
#include <string.h>

typedef enum {
    FW_OK = 0,
    FW_ERR_INSUFFICIENT_DATA = 1,
    FW_ERR_INVALID_OPTIONAL_TAG = 2,
    FW_ERR_INVALID_UTF8 = 3,
    FW_ERR_STRING_TOO_LONG = 4,
    FW_ERR_ARRAY_TOO_LONG = 5,
    FW_ERR_ALLOC = 6
} FwStatus;

/* Positioned decode failure detail. */
typedef struct {
    FwStatus code;
    size_t position;
    size_t needed;
    size_t have;
} FwError;

/* Length-counted, NUL-terminated owned string. */
typedef struct {
    char *data;
    uint16_t len;
} FwString;

typedef struct {
    uint8_t *data;
    size_t len;
    size_t cap;
} FwBuffer;

#define FW_TRY(expr) \
    do { \
        FwStatus fw_status__ = (expr); \
        if (fw_status__ != FW_OK) { \
            return fw_status__; \
        } \
    } while (0)

static FwStatus fw_fail(FwError *err, FwStatus code, size_t position) {
    err->code = code;
    err->position = position;
    err->needed = 0;
    err->have = 0;
    return code;
}

static FwStatus fw_fail_insufficient(FwError *err, size_t position, size_t needed, size_t have) {
    err->code = FW_ERR_INSUFFICIENT_DATA;
    err->position = position;
    err->needed = needed;
    err->have = have;
    return FW_ERR_INSUFFICIENT_DATA;
}

static FwStatus fw_buf_reserve(FwBuffer *buf, size_t extra) {
    size_t need;
    size_t cap;
    uint8_t *grown;
    need = buf->len + extra;
    if (need <= buf->cap) {
        return FW_OK;
    }
    cap = buf->cap == 0 ? 64 : buf->cap;
    while (cap < need) {
        cap *= 2;
    }
    grown = (uint8_t *)realloc(buf->data, cap);
    if (grown == NULL) {
        return FW_ERR_ALLOC;
    }
    buf->data = grown;
    buf->cap = cap;
    return FW_OK;
}

static FwStatus fw_write_u8(FwBuffer *buf, uint8_t v) {
    FW_TRY(fw_buf_reserve(buf, 1));
    buf->data[buf->len++] = v;
    return FW_OK;
}

static FwStatus fw_write_u16(FwBuffer *buf, uint16_t v) {
    FW_TRY(fw_buf_reserve(buf, 2));
    buf->data[buf->len++] = (uint8_t)(v & 0xFF);
    buf->data[buf->len++] = (uint8_t)(v >> 8);
    return FW_OK;
}

static FwStatus fw_write_i16(FwBuffer *buf, int16_t v) {
    return fw_write_u16(buf, (uint16_t)v);
}

static FwStatus fw_write_u32(FwBuffer *buf, uint32_t v) {
    FW_TRY(fw_buf_reserve(buf, 4));
    buf->data[buf->len++] = (uint8_t)(v & 0xFF);
    buf->data[buf->len++] = (uint8_t)((v >> 8) & 0xFF);
    buf->data[buf->len++] = (uint8_t)((v >> 16) & 0xFF);
    buf->data[buf->len++] = (uint8_t)((v >> 24) & 0xFF);
    return FW_OK;
}

static FwStatus fw_write_i32(FwBuffer *buf, int32_t v) {
    return fw_write_u32(buf, (uint32_t)v);
}

static FwStatus fw_write_u64(FwBuffer *buf, uint64_t v) {
    int shift;
    FW_TRY(fw_buf_reserve(buf, 8));
    for (shift = 0; shift < 64; shift += 8) {
        buf->data[buf->len++] = (uint8_t)((v >> shift) & 0xFF);
    }
    return FW_OK;
}

static FwStatus fw_write_i64(FwBuffer *buf, int64_t v) {
    return fw_write_u64(buf, (uint64_t)v);
}

static FwStatus fw_write_f32(FwBuffer *buf, float v) {
    uint32_t bits;
    memcpy(&bits, &v, sizeof(bits));
    return fw_write_u32(buf, bits);
}

static FwStatus fw_write_f64(FwBuffer *buf, double v) {
    uint64_t bits;
    memcpy(&bits, &v, sizeof(bits));
    return fw_write_u64(buf, bits);
}

static FwStatus fw_write_string(FwBuffer *buf, FwString v) {
    FW_TRY(fw_write_u16(buf, v.len));
    FW_TRY(fw_buf_reserve(buf, v.len));
    if (v.len > 0) {
        memcpy(buf->data + buf->len, v.data, v.len);
        buf->len += v.len;
    }
    return FW_OK;
}

static FwStatus fw_read_u8(const uint8_t *data, size_t data_len, size_t *pos, uint8_t *out,
                           FwError *err) {
    if (*pos >= data_len) {
        return fw_fail_insufficient(err, *pos, 1, 0);
    }
    *out = data[*pos];
    *pos += 1;
    return FW_OK;
}

static FwStatus fw_read_bool(const uint8_t *data, size_t data_len, size_t *pos, bool *out,
                             FwError *err) {
    uint8_t v;
    FW_TRY(fw_read_u8(data, data_len, pos, &v, err));
    *out = v != 0;
    return FW_OK;
}

static FwStatus fw_read_i8(const uint8_t *data, size_t data_len, size_t *pos, int8_t *out,
                           FwError *err) {
    uint8_t v;
    FW_TRY(fw_read_u8(data, data_len, pos, &v, err));
    *out = (int8_t)v;
    return FW_OK;
}

static FwStatus fw_read_presence(const uint8_t *data, size_t data_len, size_t *pos, bool *out,
                                 FwError *err) {
    size_t at;
    uint8_t v;
    at = *pos;
    FW_TRY(fw_read_u8(data, data_len, pos, &v, err));
    if (v == 0) {
        *out = false;
        return FW_OK;
    }
    if (v == 1) {
        *out = true;
        return FW_OK;
    }
    return fw_fail(err, FW_ERR_INVALID_OPTIONAL_TAG, at);
}

static FwStatus fw_read_u16(const uint8_t *data, size_t data_len, size_t *pos, uint16_t *out,
                            FwError *err) {
    if (*pos + 2 > data_len) {
        return fw_fail_insufficient(err, *pos, 2, data_len - *pos);
    }
    *out = (uint16_t)(data[*pos] | ((uint16_t)data[*pos + 1] << 8));
    *pos += 2;
    return FW_OK;
}

static FwStatus fw_read_i16(const uint8_t *data, size_t data_len, size_t *pos, int16_t *out,
                            FwError *err) {
    uint16_t v;
    FW_TRY(fw_read_u16(data, data_len, pos, &v, err));
    *out = (int16_t)v;
    return FW_OK;
}

static FwStatus fw_read_u32(const uint8_t *data, size_t data_len, size_t *pos, uint32_t *out,
                            FwError *err) {
    if (*pos + 4 > data_len) {
        return fw_fail_insufficient(err, *pos, 4, data_len - *pos);
    }
    *out = (uint32_t)data[*pos] | ((uint32_t)data[*pos + 1] << 8) |
           ((uint32_t)data[*pos + 2] << 16) | ((uint32_t)data[*pos + 3] << 24);
    *pos += 4;
    return FW_OK;
}

static FwStatus fw_read_i32(const uint8_t *data, size_t data_len, size_t *pos, int32_t *out,
                            FwError *err) {
    uint32_t v;
    FW_TRY(fw_read_u32(data, data_len, pos, &v, err));
    *out = (int32_t)v;
    return FW_OK;
}

static FwStatus fw_read_u64(const uint8_t *data, size_t data_len, size_t *pos, uint64_t *out,
                            FwError *err) {
    int shift;
    uint64_t v;
    if (*pos + 8 > data_len) {
        return fw_fail_insufficient(err, *pos, 8, data_len - *pos);
    }
    v = 0;
    for (shift = 0; shift < 64; shift += 8) {
        v |= (uint64_t)data[*pos] << shift;
        *pos += 1;
    }
    *out = v;
    return FW_OK;
}

static FwStatus fw_read_i64(const uint8_t *data, size_t data_len, size_t *pos, int64_t *out,
                            FwError *err) {
    uint64_t v;
    FW_TRY(fw_read_u64(data, data_len, pos, &v, err));
    *out = (int64_t)v;
    return FW_OK;
}

static FwStatus fw_read_f32(const uint8_t *data, size_t data_len, size_t *pos, float *out,
                            FwError *err) {
    uint32_t bits;
    FW_TRY(fw_read_u32(data, data_len, pos, &bits, err));
    memcpy(out, &bits, sizeof(*out));
    return FW_OK;
}

static FwStatus fw_read_f64(const uint8_t *data, size_t data_len, size_t *pos, double *out,
                            FwError *err) {
    uint64_t bits;
    FW_TRY(fw_read_u64(data, data_len, pos, &bits, err));
    memcpy(out, &bits, sizeof(*out));
    return FW_OK;
}

/* Verify len elements of the given width fit, reporting the failure at the
 * first element that does not. */
static FwStatus fw_check_elements(size_t data_len, size_t pos, size_t len, size_t width,
                                  FwError *err) {
    size_t remaining;
    size_t whole;
    remaining = data_len > pos ? data_len - pos : 0;
    if (len * width <= remaining) {
        return FW_OK;
    }
    whole = remaining / width;
    return fw_fail_insufficient(err, pos + whole * width, width, remaining - whole * width);
}

static bool fw_utf8_valid(const uint8_t *data, size_t len) {
    size_t i;
    size_t follow;
    size_t j;
    uint8_t byte;
    i = 0;
    while (i < len) {
        byte = data[i];
        if (byte < 0x80) {
            i += 1;
            continue;
        } else if ((byte & 0xE0) == 0xC0) {
            if (byte < 0xC2) {
                return false; /* overlong two-byte form */
            }
            follow = 1;
        } else if ((byte & 0xF0) == 0xE0) {
            follow = 2;
        } else if ((byte & 0xF8) == 0xF0) {
            if (byte > 0xF4) {
                return false; /* beyond U+10FFFF */
            }
            follow = 3;
        } else {
            return false;
        }
        if (i + follow >= len) {
            return false; /* truncated sequence */
        }
        for (j = 1; j <= follow; j++) {
            if ((data[i + j] & 0xC0) != 0x80) {
                return false;
            }
        }
        if (byte == 0xE0 && data[i + 1] < 0xA0) {
            return false; /* overlong three-byte form */
        }
        if (byte == 0xED && data[i + 1] >= 0xA0) {
            return false; /* surrogate */
        }
        if (byte == 0xF0 && data[i + 1] < 0x90) {
            return false; /* overlong four-byte form */
        }
        if (byte == 0xF4 && data[i + 1] >= 0x90) {
            return false; /* beyond U+10FFFF */
        }
        i += follow + 1;
    }
    return true;
}

static FwStatus fw_read_string(const uint8_t *data, size_t data_len, size_t *pos, FwString *out,
                               FwError *err) {
    uint16_t len;
    FW_TRY(fw_read_u16(data, data_len, pos, &len, err));
    if (*pos + len > data_len) {
        return fw_fail_insufficient(err, *pos, len, data_len - *pos);
    }
    if (!fw_utf8_valid(data + *pos, len)) {
        return fw_fail(err, FW_ERR_INVALID_UTF8, *pos);
    }
    out->data = (char *)malloc((size_t)len + 1);
    if (out->data == NULL) {
        return fw_fail(err, FW_ERR_ALLOC, *pos);
    }
    if (len > 0) {
        memcpy(out->data, data + *pos, len);
    }
    out->data[len] = '\0';
    out->len = len;
    *pos += len;
    return FW_OK;
}

static void fw_free_string(FwString *value) {
    free(value->data);
    value->data = NULL;
    value->len = 0;
}
"#;

/// Ordered, deduplicated accumulation of named code blocks.
#[derive(Default)]
struct NamedSet {
    names: Vec<String>,
    code: String,
}

impl NamedSet {
    fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    fn insert(&mut self, name: String, code: String) {
        self.names.push(name);
        self.code.push_str(&code);
    }
}

struct Emitter<'a> {
    ctx: &'a GenContext<'a>,
    typedefs: NamedSet,
    helpers: NamedSet,
    /// Structs currently being declared, to stop on cyclic schemas
    visiting: Vec<String>,
    api: String,
}

/// The C type for a type expression.
fn c_type(ty: &WireType) -> String {
    if ty.is_optional() {
        return format!("FwOpt{}", mangle(&non_optional(ty)));
    }
    match ty {
        WireType::Primitive { prim, .. } => scalar_type(*prim).to_string(),
        WireType::Array { elem, .. } => format!("FwList{}", mangle(elem)),
        WireType::Named { name, .. } => name.clone(),
    }
}

fn scalar_type(prim: Primitive) -> &'static str {
    match prim {
        Primitive::Bool => "bool",
        Primitive::Int8 => "int8_t",
        Primitive::Int16 => "int16_t",
        Primitive::Int32 => "int32_t",
        Primitive::Int64 => "int64_t",
        Primitive::Float32 => "float",
        Primitive::Float64 => "double",
        Primitive::String => "FwString",
    }
}

/// CamelCase mangled name for a type expression.
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

/// snake_case helper suffix for a type expression.
fn helper_suffix(ty: &WireType) -> String {
    mangle(ty).to_snake_case()
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

/// Whether decoded values of this type own heap memory.
fn needs_free(ctx: &GenContext, ty: &WireType) -> bool {
    match ty {
        WireType::Primitive { prim, .. } => *prim == Primitive::String,
        WireType::Array { .. } => true,
        WireType::Named { name, .. } => ctx
            .schema
            .get_struct(name)
            .map(|decl| decl.fields.iter().any(|f| needs_free(ctx, &f.ty)))
            .unwrap_or(false),
    }
}

impl Emitter<'_> {
    /// Emit the typedef and helpers for a struct, fields first.
    fn ensure_struct(&mut self, decl: &StructDecl) -> Result<(), GenerateError> {
        if self.typedefs.contains(&decl.name) {
            return Ok(());
        }
        if self.visiting.contains(&decl.name) {
            // A by-value cycle cannot be declared in C; validated schemas
            // never reach this.
            return Err(GenerateError::NestingDepthExceeded {
                name: decl.name.clone(),
                limit: crate::schema::MAX_NESTING_DEPTH,
            });
        }
        self.visiting.push(decl.name.clone());
        for field in &decl.fields {
            self.ensure_type(&field.ty)?;
        }
        self.visiting.pop();

        let mut code = String::new();
        let _ = writeln!(code, "typedef struct {} {{", decl.name);
        for field in &decl.fields {
            let _ = writeln!(
                code,
                "    {} {};",
                c_type(&field.ty),
                escape_keyword(&field.name, KEYWORDS)
            );
        }
        let _ = writeln!(code, "}} {};\n", decl.name);
        self.typedefs.insert(decl.name.clone(), code);

        self.emit_struct_helpers(decl);
        Ok(())
    }

    /// Emit typedefs and helpers for one type expression, innermost first.
    fn ensure_type(&mut self, ty: &WireType) -> Result<(), GenerateError> {
        if ty.is_optional() {
            let inner = non_optional(ty);
            self.ensure_type(&inner)?;
            self.emit_optional(ty, &inner);
            return Ok(());
        }
        match ty {
            WireType::Primitive { .. } => Ok(()),
            WireType::Array { elem, .. } => {
                self.ensure_type(elem)?;
                self.emit_array(ty, elem);
                Ok(())
            }
            WireType::Named { name, .. } => {
                // Resolution was checked in the pre-pass; a dangling name
                // here means the schema changed under us.
                let decl = self.ctx.schema.get_struct(name).cloned().ok_or_else(|| {
                    GenerateError::UnresolvedType { name: name.clone() }
                })?;
                self.ensure_struct(&decl)
            }
        }
    }

    fn emit_struct_helpers(&mut self, decl: &StructDecl) {
        let suffix = decl.name.to_snake_case();
        let marker = format!("struct:{}", decl.name);
        if self.helpers.contains(&marker) {
            return;
        }
        let mut code = String::new();

        let _ = writeln!(
            code,
            "static FwStatus fw_encode_{suffix}(const {} *value, FwBuffer *buf) {{",
            decl.name
        );
        for field in &decl.fields {
            let access = format!("value->{}", escape_keyword(&field.name, KEYWORDS));
            code.push_str(&indent(&encode_stmt(&field.ty, &access), 4));
        }
        let _ = writeln!(code, "    return FW_OK;");
        let _ = writeln!(code, "}}\n");

        let _ = writeln!(
            code,
            "static FwStatus fw_decode_{suffix}(const uint8_t *data, size_t data_len, size_t *pos,"
        );
        let _ = writeln!(
            code,
            "                                   {} *out, FwError *err) {{",
            decl.name
        );
        for field in &decl.fields {
            let target = format!("out->{}", escape_keyword(&field.name, KEYWORDS));
            let _ = writeln!(code, "    {}", decode_stmt(&field.ty, &target));
        }
        let _ = writeln!(code, "    return FW_OK;");
        let _ = writeln!(code, "}}\n");

        if decl.fields.iter().any(|f| needs_free(self.ctx, &f.ty)) {
            let _ = writeln!(
                code,
                "static void fw_free_{suffix}({} *value) {{",
                decl.name
            );
            for field in &decl.fields {
                if needs_free(self.ctx, &field.ty) {
                    let access = format!("value->{}", escape_keyword(&field.name, KEYWORDS));
                    let _ = writeln!(code, "    {}", free_stmt(&field.ty, &access));
                }
            }
            let _ = writeln!(code, "}}\n");
        }

        self.helpers.insert(marker, code);
    }

    fn emit_optional(&mut self, ty: &WireType, inner: &WireType) {
        let name = mangle(ty);
        if self.typedefs.contains(&name) {
            return;
        }
        let inner_ty = c_type(inner);

        let mut decl = String::new();
        let _ = writeln!(decl, "typedef struct {{");
        let _ = writeln!(decl, "    bool has;");
        let _ = writeln!(decl, "    {inner_ty} value;");
        let _ = writeln!(decl, "}} Fw{name};\n");
        self.typedefs.insert(name.clone(), decl);

        let suffix = helper_suffix(ty);
        let mut code = String::new();

        let _ = writeln!(
            code,
            "static FwStatus fw_encode_{suffix}(const Fw{name} *value, FwBuffer *buf) {{"
        );
        let _ = writeln!(code, "    if (!value->has) {{");
        let _ = writeln!(code, "        return fw_write_u8(buf, 0);");
        let _ = writeln!(code, "    }}");
        let _ = writeln!(code, "    FW_TRY(fw_write_u8(buf, 1));");
        code.push_str(&indent(&encode_stmt(inner, "value->value"), 4));
        let _ = writeln!(code, "    return FW_OK;");
        let _ = writeln!(code, "}}\n");

        let _ = writeln!(
            code,
            "static FwStatus fw_decode_{suffix}(const uint8_t *data, size_t data_len, size_t *pos,"
        );
        let _ = writeln!(
            code,
            "                                   Fw{name} *out, FwError *err) {{"
        );
        let _ = writeln!(
            code,
            "    FW_TRY(fw_read_presence(data, data_len, pos, &out->has, err));"
        );
        let _ = writeln!(code, "    if (!out->has) {{");
        let _ = writeln!(code, "        return FW_OK;");
        let _ = writeln!(code, "    }}");
        let _ = writeln!(code, "    {}", decode_stmt(inner, "out->value"));
        let _ = writeln!(code, "    return FW_OK;");
        let _ = writeln!(code, "}}\n");

        if needs_free(self.ctx, inner) {
            let _ = writeln!(code, "static void fw_free_{suffix}(Fw{name} *value) {{");
            let _ = writeln!(code, "    if (value->has) {{");
            let _ = writeln!(code, "        {}", free_stmt(inner, "value->value"));
            let _ = writeln!(code, "    }}");
            let _ = writeln!(code, "    value->has = false;");
            let _ = writeln!(code, "}}\n");
        }

        self.helpers.insert(format!("helper:{name}"), code);
    }

    fn emit_array(&mut self, ty: &WireType, elem: &WireType) {
        let name = mangle(ty);
        if self.typedefs.contains(&name) {
            return;
        }
        let elem_ty = c_type(elem);

        let mut decl = String::new();
        let _ = writeln!(decl, "typedef struct {{");
        let _ = writeln!(decl, "    {elem_ty} *items;");
        let _ = writeln!(decl, "    uint16_t len;");
        let _ = writeln!(decl, "}} Fw{name};\n");
        self.typedefs.insert(name.clone(), decl);

        let suffix = helper_suffix(ty);
        let width = bulk_width(elem);
        let mut code = String::new();

        let _ = writeln!(
            code,
            "static FwStatus fw_encode_{suffix}(const Fw{name} *value, FwBuffer *buf) {{"
        );
        let _ = writeln!(code, "    size_t i;");
        let _ = writeln!(code, "    FW_TRY(fw_write_u16(buf, value->len));");
        if let Some(width) = width {
            let _ = writeln!(code, "#if defined(__BYTE_ORDER__) && __BYTE_ORDER__ == __ORDER_LITTLE_ENDIAN__");
            let _ = writeln!(code, "    /* Host layout matches wire layout: one bulk copy. */");
            let _ = writeln!(code, "    (void)i;");
            let _ = writeln!(
                code,
                "    FW_TRY(fw_buf_reserve(buf, (size_t)value->len * {width}));"
            );
            let _ = writeln!(code, "    if (value->len > 0) {{");
            let _ = writeln!(
                code,
                "        memcpy(buf->data + buf->len, value->items, (size_t)value->len * {width});"
            );
            let _ = writeln!(code, "        buf->len += (size_t)value->len * {width};");
            let _ = writeln!(code, "    }}");
            let _ = writeln!(code, "#else");
            let _ = writeln!(code, "    for (i = 0; i < value->len; i++) {{");
            code.push_str(&indent(&encode_stmt(elem, "value->items[i]"), 8));
            let _ = writeln!(code, "    }}");
            let _ = writeln!(code, "#endif");
        } else {
            let _ = writeln!(code, "    for (i = 0; i < value->len; i++) {{");
            code.push_str(&indent(&encode_stmt(elem, "value->items[i]"), 8));
            let _ = writeln!(code, "    }}");
        }
        let _ = writeln!(code, "    return FW_OK;");
        let _ = writeln!(code, "}}\n");

        let _ = writeln!(
            code,
            "static FwStatus fw_decode_{suffix}(const uint8_t *data, size_t data_len, size_t *pos,"
        );
        let _ = writeln!(
            code,
            "                                   Fw{name} *out, FwError *err) {{"
        );
        let _ = writeln!(code, "    uint16_t len;");
        let _ = writeln!(code, "    size_t i;");
        let _ = writeln!(code, "    FW_TRY(fw_read_u16(data, data_len, pos, &len, err));");
        if let Some(width) = width {
            let _ = writeln!(
                code,
                "    FW_TRY(fw_check_elements(data_len, *pos, len, {width}, err));"
            );
        }
        let _ = writeln!(code, "    out->items = NULL;");
        let _ = writeln!(code, "    out->len = 0;");
        let _ = writeln!(code, "    if (len == 0) {{");
        let _ = writeln!(code, "        return FW_OK;");
        let _ = writeln!(code, "    }}");
        let _ = writeln!(
            code,
            "    out->items = ({elem_ty} *)calloc(len, sizeof({elem_ty}));"
        );
        let _ = writeln!(code, "    if (out->items == NULL) {{");
        let _ = writeln!(code, "        return fw_fail(err, FW_ERR_ALLOC, *pos);");
        let _ = writeln!(code, "    }}");
        let _ = writeln!(code, "    out->len = len;");
        if let Some(width) = width {
            let _ = writeln!(code, "#if defined(__BYTE_ORDER__) && __BYTE_ORDER__ == __ORDER_LITTLE_ENDIAN__");
            let _ = writeln!(code, "    (void)i;");
            let _ = writeln!(
                code,
                "    memcpy(out->items, data + *pos, (size_t)len * {width});"
            );
            let _ = writeln!(code, "    *pos += (size_t)len * {width};");
            let _ = writeln!(code, "#else");
            let _ = writeln!(code, "    for (i = 0; i < len; i++) {{");
            let _ = writeln!(code, "        {}", decode_stmt(elem, "out->items[i]"));
            let _ = writeln!(code, "    }}");
            let _ = writeln!(code, "#endif");
        } else {
            let _ = writeln!(code, "    for (i = 0; i < len; i++) {{");
            let _ = writeln!(code, "        {}", decode_stmt(elem, "out->items[i]"));
            let _ = writeln!(code, "    }}");
        }
        let _ = writeln!(code, "    return FW_OK;");
        let _ = writeln!(code, "}}\n");

        let _ = writeln!(code, "static void fw_free_{suffix}(Fw{name} *value) {{");
        if needs_free(self.ctx, elem) {
            let _ = writeln!(code, "    size_t i;");
            let _ = writeln!(code, "    for (i = 0; i < value->len; i++) {{");
            let _ = writeln!(code, "        {}", free_stmt(elem, "value->items[i]"));
            let _ = writeln!(code, "    }}");
        }
        let _ = writeln!(code, "    free(value->items);");
        let _ = writeln!(code, "    value->items = NULL;");
        let _ = writeln!(code, "    value->len = 0;");
        let _ = writeln!(code, "}}\n");

        self.helpers.insert(format!("helper:{name}"), code);
    }

    /// Emit the public entry points for one message.
    fn emit_entry(&mut self, entry: &MessageEntry) -> Result<(), GenerateError> {
        let target = &entry.message.target;
        self.ensure_type(target)?;

        let value_ty = c_type(target);
        let capacity = self.ctx.capacity_hint(&entry.message.name);
        let encode_name = encode_entry(&entry.root);
        let decode_name = decode_entry(&entry.root);
        let free_name = format!("Free{}Message", entry.root);
        let out = &mut self.api;

        // Scalars pass by value; compound targets by const pointer.
        let by_value = matches!(
            target,
            WireType::Primitive {
                prim,
                optional: false,
            } if *prim != Primitive::String
        );
        let param = if by_value {
            format!("{value_ty} value")
        } else {
            format!("const {value_ty} *value")
        };
        let encode_arg = if by_value { "value" } else { "*value" };

        let _ = writeln!(
            out,
            "/* Encode a {} message into wire-format bytes. The buffer is",
            entry.message.name
        );
        let _ = writeln!(out, " * malloc'ed; the caller owns and frees it. */");
        let _ = writeln!(
            out,
            "FwStatus {encode_name}({param}, uint8_t **out_data, size_t *out_len) {{"
        );
        let _ = writeln!(out, "    FwBuffer buf = {{NULL, 0, 0}};");
        let _ = writeln!(out, "    FwStatus status;");
        let _ = writeln!(out, "    status = fw_buf_reserve(&buf, {capacity});");
        let _ = writeln!(out, "    if (status != FW_OK) {{");
        let _ = writeln!(out, "        return status;");
        let _ = writeln!(out, "    }}");
        let stmt = encode_stmt_status(target, encode_arg);
        let _ = writeln!(out, "    status = {stmt};");
        let _ = writeln!(out, "    if (status != FW_OK) {{");
        let _ = writeln!(out, "        free(buf.data);");
        let _ = writeln!(out, "        return status;");
        let _ = writeln!(out, "    }}");
        let _ = writeln!(out, "    *out_data = buf.data;");
        let _ = writeln!(out, "    *out_len = buf.len;");
        let _ = writeln!(out, "    return FW_OK;");
        let _ = writeln!(out, "}}\n");

        let _ = writeln!(
            out,
            "/* Decode a {} message. On failure the out-value is freed and",
            entry.message.name
        );
        let _ = writeln!(out, " * zeroed; err (optional) receives the detail. */");
        let _ = writeln!(
            out,
            "FwStatus {decode_name}(const uint8_t *data, size_t data_len, {value_ty} *out,"
        );
        let _ = writeln!(out, "                        FwError *err) {{");
        let _ = writeln!(out, "    size_t pos = 0;");
        let _ = writeln!(out, "    FwError local_err = {{FW_OK, 0, 0, 0}};");
        let _ = writeln!(out, "    FwStatus status;");
        let _ = writeln!(out, "    if (err == NULL) {{");
        let _ = writeln!(out, "        err = &local_err;");
        let _ = writeln!(out, "    }}");
        let _ = writeln!(out, "    memset(out, 0, sizeof(*out));");
        let stmt = decode_stmt_status(target, "out");
        let _ = writeln!(out, "    status = {stmt};");
        let _ = writeln!(out, "    if (status != FW_OK) {{");
        let _ = writeln!(out, "        {free_name}(out);");
        let _ = writeln!(out, "    }}");
        let _ = writeln!(out, "    return status;");
        let _ = writeln!(out, "}}\n");

        let _ = writeln!(
            out,
            "/* Release memory owned by a decoded {} message. */",
            entry.message.name
        );
        let _ = writeln!(out, "void {free_name}({value_ty} *value) {{");
        if needs_free(self.ctx, target) {
            let _ = writeln!(out, "    {}", free_stmt(target, "*value"));
        } else {
            let _ = writeln!(out, "    (void)value;");
        }
        let _ = writeln!(out, "}}\n");

        Ok(())
    }
}

/// Element width when an array qualifies for the bulk memcpy path.
fn bulk_width(elem: &WireType) -> Option<usize> {
    match elem {
        WireType::Primitive {
            prim,
            optional: false,
        } => match prim {
            // bool's in-memory size is guaranteed 1 but its representation
            // is not the wire's 0x00/0x01 contract to rely on; skip it.
            Primitive::Int8 => Some(1),
            Primitive::Int16 => Some(2),
            Primitive::Int32 | Primitive::Float32 => Some(4),
            Primitive::Int64 | Primitive::Float64 => Some(8),
            _ => None,
        },
        _ => None,
    }
}

/// One encode statement (FW_TRY-wrapped) for a type expression.
fn encode_stmt(ty: &WireType, expr: &str) -> String {
    format!("FW_TRY({});\n", encode_stmt_status(ty, expr))
}

/// The bare status-returning encode call for a type expression.
fn encode_stmt_status(ty: &WireType, expr: &str) -> String {
    if ty.is_optional() {
        return format!("fw_encode_{}(&{expr}, buf)", helper_suffix(ty));
    }
    match ty {
        WireType::Primitive { prim, .. } => match prim {
            Primitive::Bool => format!("fw_write_u8(buf, {expr} ? 1 : 0)"),
            Primitive::Int8 => format!("fw_write_u8(buf, (uint8_t){expr})"),
            Primitive::Int16 => format!("fw_write_i16(buf, {expr})"),
            Primitive::Int32 => format!("fw_write_i32(buf, {expr})"),
            Primitive::Int64 => format!("fw_write_i64(buf, {expr})"),
            Primitive::Float32 => format!("fw_write_f32(buf, {expr})"),
            Primitive::Float64 => format!("fw_write_f64(buf, {expr})"),
            Primitive::String => format!("fw_write_string(buf, {expr})"),
        },
        WireType::Array { .. } | WireType::Named { .. } => {
            format!("fw_encode_{}(&{expr}, buf)", helper_suffix(ty))
        }
    }
}

/// One decode statement (FW_TRY-wrapped) writing into `target`.
fn decode_stmt(ty: &WireType, target: &str) -> String {
    format!("FW_TRY({});", decode_stmt_status(ty, &format!("&{target}")))
}

/// The bare status-returning decode call; `target` is already a pointer.
fn decode_stmt_status(ty: &WireType, target: &str) -> String {
    if ty.is_optional() {
        return format!(
            "fw_decode_{}(data, data_len, {}, {target}, err)",
            helper_suffix(ty),
            pos_arg(target)
        );
    }
    match ty {
        WireType::Primitive { prim, .. } => {
            let reader = match prim {
                Primitive::Bool => "fw_read_bool",
                Primitive::Int8 => "fw_read_i8",
                Primitive::Int16 => "fw_read_i16",
                Primitive::Int32 => "fw_read_i32",
                Primitive::Int64 => "fw_read_i64",
                Primitive::Float32 => "fw_read_f32",
                Primitive::Float64 => "fw_read_f64",
                Primitive::String => "fw_read_string",
            };
            format!("{reader}(data, data_len, {}, {target}, err)", pos_arg(target))
        }
        WireType::Array { .. } | WireType::Named { .. } => format!(
            "fw_decode_{}(data, data_len, {}, {target}, err)",
            helper_suffix(ty),
            pos_arg(target)
        ),
    }
}

/// Helpers take `size_t *pos`; the public entries hold `pos` by value.
fn pos_arg(target: &str) -> &'static str {
    if target == "out" {
        "&pos"
    } else {
        "pos"
    }
}

/// One free statement for an owned value.
fn free_stmt(ty: &WireType, expr: &str) -> String {
    if ty.is_optional() {
        return format!("fw_free_{}(&{expr});", helper_suffix(ty));
    }
    match ty {
        WireType::Primitive { prim, .. } if *prim == Primitive::String => {
            format!("fw_free_string(&{expr});")
        }
        WireType::Primitive { .. } => String::new(),
        WireType::Array { .. } | WireType::Named { .. } => {
            format!("fw_free_{}(&{expr});", helper_suffix(ty))
        }
    }
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
        let ctx = build_context_for_tests(&schema, Target::C);
        emit(&ctx).expect("emit")
    }

    #[test]
    fn test_emit_struct_and_entries() {
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
        assert!(source.contains("typedef struct Config {"));
        assert!(source.contains("    FwString name;"));
        assert!(source.contains("    int32_t value;"));
        assert!(source.contains(
            "FwStatus EncodeConfigMessage(const Config *value, uint8_t **out_data, size_t *out_len)"
        ));
        assert!(source.contains("FwStatus DecodeConfigMessage(const uint8_t *data"));
        assert!(source.contains("void FreeConfigMessage(Config *value)"));
    }

    #[test]
    fn test_emit_typedefs_precede_use() {
        let source = emit_for(
            r#"
package demo

type Outer struct {
    inner Inner
}

type Inner struct {
    x int16
}

type OuterMessage = Outer
"#,
        );
        // Inner is declared after Outer in the IDL, but C needs it first.
        let inner_at = source.find("typedef struct Inner {").expect("Inner typedef");
        let outer_at = source.find("typedef struct Outer {").expect("Outer typedef");
        assert!(inner_at < outer_at);
    }

    #[test]
    fn test_emit_array_bulk_memcpy() {
        let source = emit_for("package demo\n\ntype IntList = []int32\n");
        assert!(source.contains("typedef struct {\n    int32_t *items;"));
        assert!(source.contains("__ORDER_LITTLE_ENDIAN__"));
        assert!(source.contains("fw_check_elements(data_len, *pos, len, 4, err)"));
        assert!(source.contains("FwStatus EncodeInt32Message(const FwListInt32 *value"));
    }

    #[test]
    fn test_emit_optional_typedef() {
        let source = emit_for("package demo\n\ntype OptInt = *int32\n");
        assert!(source.contains("} FwOptInt32;"));
        assert!(source.contains("fw_read_presence"));
        assert!(source.contains("FW_ERR_INVALID_OPTIONAL_TAG"));
    }

    #[test]
    fn test_emit_scalar_root_passes_by_value() {
        let source = emit_for("package demo\n\ntype Answer = int32\n");
        assert!(source.contains(
            "FwStatus EncodeInt32Message(int32_t value, uint8_t **out_data, size_t *out_len)"
        ));
    }

    #[test]
    fn test_emit_free_functions_for_owned_memory() {
        let source = emit_for("package demo\n\ntype Names = []string\n");
        assert!(source.contains("fw_free_string(&value->items[i]);"));
        assert!(source.contains("void FreeStringMessage(FwListString *value)"));
    }

    #[test]
    fn test_emit_is_deterministic() {
        let src = "package demo\n\ntype A struct { x []int16\n y *string }\n\ntype AMessage = A\n";
        assert_eq!(emit_for(src), emit_for(src));
    }
}
