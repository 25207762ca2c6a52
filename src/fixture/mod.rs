// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Fixture conversion: JSON test data to wire-format bytes.
//!
//! Given a validated schema, a message name, and a JSON document, the
//! converter checks the document against the message's type and emits the
//! canonical wire encoding. Fixtures produced here are the deterministic
//! inputs the cross-language test suites decode.
//!
//! JSON keys map to fields through the field's `json:"..."` tag key when one
//! is present, otherwise the field name verbatim. Extra keys are rejected,
//! missing non-optional fields are rejected, and every number is
//! range-checked against its declared primitive before encoding. JSON
//! strings arrive UTF-8 valid by construction; only the 65 535-byte ceiling
//! is checked here.

use serde_json::Value as JsonValue;

use crate::core::{ExpectedKind, FieldMap, FixtureError, Primitive, Value, MAX_LENGTH};
use crate::schema::{Schema, WireType};
use crate::wire::{CodecError, MessageCodec};

/// Convert JSON bytes to wire-format bytes for one message.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use fastwire::{fixture, schema};
///
/// let schema = schema::load(
///     "package demo\n\ntype Config struct {\n    name string\n    value int32\n}\n\ntype M = Config\n",
/// )?;
/// let bytes = fixture::convert(&schema, "M", br#"{"name": "test", "value": 42}"#)?;
/// assert_eq!(bytes.len(), 10);
/// # Ok(())
/// # }
/// ```
pub fn convert(schema: &Schema, message: &str, json: &[u8]) -> Result<Vec<u8>, CodecError> {
    let codec = MessageCodec::new(schema, message)?;
    let value = parse_message(schema, message, json)?;
    codec.encode(&value)
}

/// Parse JSON bytes into a [`Value`] tree typed by one message.
pub fn parse_message(schema: &Schema, message: &str, json: &[u8]) -> Result<Value, CodecError> {
    let decl = schema
        .get_message(message)
        .ok_or_else(|| FixtureError::MessageNotFound {
            message: message.to_string(),
        })?;
    let root: JsonValue = serde_json::from_slice(json).map_err(|e| FixtureError::InvalidJson {
        message: e.to_string(),
    })?;
    parse_value(schema, &decl.target, &root, message)
}

/// Parse one JSON value against a type expression.
///
/// `path` names the position for error context ("M.config.name").
pub fn parse_value(
    schema: &Schema,
    ty: &WireType,
    json: &JsonValue,
    path: &str,
) -> Result<Value, CodecError> {
    if json.is_null() {
        if ty.is_optional() {
            return Ok(Value::Null);
        }
        return Err(FixtureError::expected(path, expected_kind(ty), "null").into());
    }

    match ty {
        WireType::Primitive { prim, .. } => parse_primitive(*prim, json, path),
        WireType::Array { elem, .. } => {
            let items = json
                .as_array()
                .ok_or_else(|| FixtureError::expected(path, ExpectedKind::Array, kind_of(json)))?;
            if items.len() > MAX_LENGTH {
                return Err(FixtureError::ArrayTooLong {
                    field: path.to_string(),
                    length: items.len(),
                }
                .into());
            }
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                out.push(parse_value(schema, elem, item, &format!("{path}[{index}]"))?);
            }
            Ok(Value::Array(out))
        }
        WireType::Named { name, .. } => parse_struct(schema, name, json, path),
    }
}

fn parse_struct(
    schema: &Schema,
    name: &str,
    json: &JsonValue,
    path: &str,
) -> Result<Value, CodecError> {
    let decl = schema
        .get_struct(name)
        .ok_or_else(|| CodecError::UnknownType {
            name: name.to_string(),
        })?;
    let object = json
        .as_object()
        .ok_or_else(|| FixtureError::expected(path, ExpectedKind::Object, kind_of(json)))?;

    // Every JSON key must map to a field through its wire key.
    for key in object.keys() {
        if !decl.fields.iter().any(|f| f.wire_key() == key) {
            return Err(FixtureError::UnknownField {
                field: format!("{path}.{key}"),
            }
            .into());
        }
    }

    let mut map = FieldMap::with_capacity(decl.fields.len());
    for field in &decl.fields {
        let field_path = format!("{path}.{}", field.name);
        match object.get(field.wire_key()) {
            Some(JsonValue::Null) | None if field.is_optional() => {
                // Absent and explicit null both encode as the absence flag.
            }
            Some(item) => {
                let value = parse_value(schema, &field.ty, item, &field_path)?;
                map.insert(field.name.clone(), value);
            }
            None => {
                return Err(FixtureError::RequiredFieldMissing { field: field_path }.into());
            }
        }
    }
    Ok(Value::Struct(map))
}

fn parse_primitive(prim: Primitive, json: &JsonValue, path: &str) -> Result<Value, CodecError> {
    match prim {
        Primitive::Bool => match json {
            JsonValue::Bool(b) => Ok(Value::Bool(*b)),
            other => Err(FixtureError::expected(path, ExpectedKind::Bool, kind_of(other)).into()),
        },
        Primitive::Int8 => Ok(Value::Int8(parse_int(prim, json, path)? as i8)),
        Primitive::Int16 => Ok(Value::Int16(parse_int(prim, json, path)? as i16)),
        Primitive::Int32 => Ok(Value::Int32(parse_int(prim, json, path)? as i32)),
        Primitive::Int64 => Ok(Value::Int64(parse_int(prim, json, path)?)),
        Primitive::Float32 => {
            let v = parse_number(json, path)?;
            if v.is_finite() && v.abs() > f32::MAX as f64 {
                return Err(FixtureError::out_of_range(path, prim, v).into());
            }
            Ok(Value::Float32(v as f32))
        }
        Primitive::Float64 => Ok(Value::Float64(parse_number(json, path)?)),
        Primitive::String => {
            let s = json
                .as_str()
                .ok_or_else(|| FixtureError::expected(path, ExpectedKind::String, kind_of(json)))?;
            if s.len() > MAX_LENGTH {
                return Err(FixtureError::StringTooLong {
                    field: path.to_string(),
                    length: s.len(),
                }
                .into());
            }
            Ok(Value::String(s.to_string()))
        }
    }
}

/// Parse a JSON number as an integer, range-checked against the primitive.
fn parse_int(prim: Primitive, json: &JsonValue, path: &str) -> Result<i64, CodecError> {
    let number = json
        .as_number()
        .ok_or_else(|| FixtureError::expected(path, ExpectedKind::Integer, kind_of(json)))?;
    let v = match number.as_i64() {
        Some(v) => v,
        // u64-only and fractional numbers: the former is out of range for
        // every signed primitive, the latter is not an integer at all.
        None if number.as_u64().is_some() => {
            return Err(FixtureError::out_of_range(path, prim, number).into());
        }
        None => {
            return Err(
                FixtureError::expected(path, ExpectedKind::Integer, number.to_string()).into(),
            );
        }
    };
    let in_range = match prim {
        Primitive::Int8 => v >= i8::MIN as i64 && v <= i8::MAX as i64,
        Primitive::Int16 => v >= i16::MIN as i64 && v <= i16::MAX as i64,
        Primitive::Int32 => v >= i32::MIN as i64 && v <= i32::MAX as i64,
        _ => true,
    };
    if in_range {
        Ok(v)
    } else {
        Err(FixtureError::out_of_range(path, prim, v).into())
    }
}

fn parse_number(json: &JsonValue, path: &str) -> Result<f64, CodecError> {
    json.as_f64()
        .ok_or_else(|| FixtureError::expected(path, ExpectedKind::Number, kind_of(json)).into())
}

/// Render a decoded [`Value`] back to JSON, for round-trip verification.
///
/// Float32 values widen to JSON's double representation; non-finite floats
/// have no JSON rendering and become null.
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Bool(v) => JsonValue::Bool(*v),
        Value::Int8(v) => JsonValue::from(*v),
        Value::Int16(v) => JsonValue::from(*v),
        Value::Int32(v) => JsonValue::from(*v),
        Value::Int64(v) => JsonValue::from(*v),
        Value::Float32(v) => serde_json::Number::from_f64(*v as f64)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Float64(v) => serde_json::Number::from_f64(*v)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::String(v) => JsonValue::String(v.clone()),
        Value::Array(items) => JsonValue::Array(items.iter().map(value_to_json).collect()),
        Value::Struct(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                object.insert(key.clone(), value_to_json(&map[key]));
            }
            JsonValue::Object(object)
        }
        Value::Null => JsonValue::Null,
    }
}

/// The JSON kind a type expression requires, for error messages.
fn expected_kind(ty: &WireType) -> ExpectedKind {
    match ty {
        WireType::Primitive { prim, .. } => match prim {
            Primitive::Bool => ExpectedKind::Bool,
            Primitive::Int8 | Primitive::Int16 | Primitive::Int32 | Primitive::Int64 => {
                ExpectedKind::Integer
            }
            Primitive::Float32 | Primitive::Float64 => ExpectedKind::Number,
            Primitive::String => ExpectedKind::String,
        },
        WireType::Array { .. } => ExpectedKind::Array,
        WireType::Named { .. } => ExpectedKind::Object,
    }
}

/// A short rendering of a JSON value's kind for error messages.
fn kind_of(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
