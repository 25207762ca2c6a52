// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema-driven reference codec.
//!
//! [`MessageCodec`] walks a validated schema and encodes/decodes [`Value`]
//! trees in the wire format. Generated backends must reproduce these bytes
//! exactly; the cross-language test fixtures are produced through this path.
//!
//! Encoding walks struct fields in declaration order and concatenates field
//! encodings with no padding; nested structs are inline. Decoding performs a
//! bounds-checked read per value and never panics on malformed input.

use std::fmt;

use crate::core::{FieldMap, FixtureError, Primitive, Value, WireError, MAX_LENGTH};
use crate::schema::{analyze, Schema, WireType};
use crate::wire::cursor::WireCursor;
use crate::wire::encoder::WireEncoder;

/// Ceiling on the analyzer-derived buffer pre-allocation, so a message whose
/// bound assumes 65 535-element arrays does not reserve gigabytes up front.
const MAX_PREALLOC: u64 = 64 * 1024;

/// Errors from the reference codec: wire-level on decode, value-level on
/// encode, plus the defensive unknown-type case for unvalidated schemas.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Malformed wire bytes
    Wire(WireError),
    /// Value does not fit the schema
    Value(FixtureError),
    /// A named reference did not resolve (schema skipped validation)
    UnknownType {
        /// The unresolved name
        name: String,
    },
}

impl CodecError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::Wire(err) => err.code(),
            CodecError::Value(err) => err.code(),
            CodecError::UnknownType { .. } => "unknown-type",
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Wire(err) => err.fmt(f),
            CodecError::Value(err) => err.fmt(f),
            CodecError::UnknownType { name } => write!(f, "unknown type '{name}'"),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<WireError> for CodecError {
    fn from(err: WireError) -> Self {
        CodecError::Wire(err)
    }
}

impl From<FixtureError> for CodecError {
    fn from(err: FixtureError) -> Self {
        CodecError::Value(err)
    }
}

/// Encoder/decoder for one message of a schema.
///
/// The schema must already have been validated; construction only resolves
/// the message name and computes the size bound used for pre-allocation.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use fastwire::schema;
/// use fastwire::wire::MessageCodec;
/// use fastwire::Value;
///
/// let schema = schema::load("package demo\n\ntype Answer = int32\n")?;
/// let codec = MessageCodec::new(&schema, "Answer")?;
/// let bytes = codec.encode(&Value::Int32(42))?;
/// assert_eq!(bytes, vec![0x2A, 0x00, 0x00, 0x00]);
/// assert_eq!(codec.decode(&bytes)?, Value::Int32(42));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MessageCodec<'a> {
    schema: &'a Schema,
    message: String,
    target: &'a WireType,
    /// Analyzer bound on the encoded size, for buffer pre-allocation
    max_size: Option<u64>,
}

impl<'a> MessageCodec<'a> {
    /// Create a codec for the named message.
    pub fn new(schema: &'a Schema, message: &str) -> Result<Self, CodecError> {
        let decl = schema
            .get_message(message)
            .ok_or_else(|| FixtureError::MessageNotFound {
                message: message.to_string(),
            })?;
        let infos = analyze(schema);
        let max_size = infos.get(message).and_then(|info| info.max_size);
        Ok(Self {
            schema,
            message: message.to_string(),
            target: &decl.target,
            max_size,
        })
    }

    /// Encode a value into wire-format bytes.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        let capacity = self
            .max_size
            .map(|m| m.min(MAX_PREALLOC) as usize)
            .unwrap_or(MAX_PREALLOC as usize);
        let mut encoder = WireEncoder::with_capacity(capacity);
        self.encode_type(self.target, value, &self.message, &mut encoder)?;
        Ok(encoder.finish())
    }

    /// Decode wire-format bytes back into a value.
    ///
    /// Trailing bytes after the message are ignored; the wire format carries
    /// no framing, so the caller owns the buffer boundary.
    pub fn decode(&self, data: &[u8]) -> Result<Value, CodecError> {
        let mut cursor = WireCursor::new(data);
        self.decode_type(self.target, &mut cursor)
    }

    // ------------------------------------------------------------------
    // Encoding
    // ------------------------------------------------------------------

    fn encode_type(
        &self,
        ty: &WireType,
        value: &Value,
        path: &str,
        encoder: &mut WireEncoder,
    ) -> Result<(), CodecError> {
        if ty.is_optional() {
            if value.is_null() {
                encoder.write_presence(false);
                return Ok(());
            }
            encoder.write_presence(true);
        } else if value.is_null() {
            return Err(FixtureError::TypeMismatch {
                field: path.to_string(),
                expected: ty.to_string(),
                found: "null".to_string(),
            }
            .into());
        }

        match ty {
            WireType::Primitive { prim, .. } => self.encode_primitive(*prim, value, path, encoder),
            WireType::Array { elem, .. } => self.encode_array(elem, value, path, encoder),
            WireType::Named { name, .. } => self.encode_struct(name, value, path, encoder),
        }
    }

    fn encode_primitive(
        &self,
        prim: Primitive,
        value: &Value,
        path: &str,
        encoder: &mut WireEncoder,
    ) -> Result<(), CodecError> {
        match prim {
            Primitive::Bool => {
                let v = value
                    .as_bool()
                    .ok_or_else(|| mismatch(path, prim.name(), value))?;
                encoder.write_bool(v);
            }
            Primitive::Int8 | Primitive::Int16 | Primitive::Int32 | Primitive::Int64 => {
                let v = value
                    .as_i64()
                    .ok_or_else(|| mismatch(path, prim.name(), value))?;
                let v = check_int_range(path, prim, v)?;
                match prim {
                    Primitive::Int8 => encoder.write_i8(v as i8),
                    Primitive::Int16 => encoder.write_i16(v as i16),
                    Primitive::Int32 => encoder.write_i32(v as i32),
                    _ => encoder.write_i64(v),
                }
            }
            Primitive::Float32 => {
                let v = value
                    .as_f64()
                    .ok_or_else(|| mismatch(path, prim.name(), value))?;
                if v.is_finite() && v.abs() > f32::MAX as f64 {
                    return Err(FixtureError::out_of_range(path, prim, v).into());
                }
                encoder.write_f32(v as f32);
            }
            Primitive::Float64 => {
                let v = value
                    .as_f64()
                    .ok_or_else(|| mismatch(path, prim.name(), value))?;
                encoder.write_f64(v);
            }
            Primitive::String => {
                let v = value
                    .as_str()
                    .ok_or_else(|| mismatch(path, prim.name(), value))?;
                if v.len() > MAX_LENGTH {
                    return Err(FixtureError::StringTooLong {
                        field: path.to_string(),
                        length: v.len(),
                    }
                    .into());
                }
                encoder.write_string(v);
            }
        }
        Ok(())
    }

    fn encode_array(
        &self,
        elem: &WireType,
        value: &Value,
        path: &str,
        encoder: &mut WireEncoder,
    ) -> Result<(), CodecError> {
        let items = value
            .as_array()
            .ok_or_else(|| mismatch(path, "array", value))?;
        if items.len() > MAX_LENGTH {
            return Err(FixtureError::ArrayTooLong {
                field: path.to_string(),
                length: items.len(),
            }
            .into());
        }
        encoder.write_len(items.len() as u16);

        if let Some(prim) = bulk_primitive(elem) {
            return self.encode_primitive_elements(prim, items, path, encoder);
        }

        for (index, item) in items.iter().enumerate() {
            self.encode_type(elem, item, &format!("{path}[{index}]"), encoder)?;
        }
        Ok(())
    }

    /// Encode an array of a fixed-width primitive through the bulk-copy path:
    /// the values are collected into a typed slice and written in one copy.
    fn encode_primitive_elements(
        &self,
        prim: Primitive,
        items: &[Value],
        path: &str,
        encoder: &mut WireEncoder,
    ) -> Result<(), CodecError> {
        match prim {
            Primitive::Bool => {
                for (index, item) in items.iter().enumerate() {
                    let v = item
                        .as_bool()
                        .ok_or_else(|| mismatch(&format!("{path}[{index}]"), "bool", item))?;
                    encoder.write_bool(v);
                }
            }
            Primitive::Int8 => {
                for (index, item) in items.iter().enumerate() {
                    let elem_path = format!("{path}[{index}]");
                    let v = item
                        .as_i64()
                        .ok_or_else(|| mismatch(&elem_path, "int8", item))?;
                    let v = check_int_range(&elem_path, prim, v)?;
                    encoder.write_i8(v as i8);
                }
            }
            Primitive::Int16 => {
                let values = self.collect_ints(prim, items, path)?;
                let values: Vec<i16> = values.into_iter().map(|v| v as i16).collect();
                encoder.write_i16_slice(&values);
            }
            Primitive::Int32 => {
                let values = self.collect_ints(prim, items, path)?;
                let values: Vec<i32> = values.into_iter().map(|v| v as i32).collect();
                encoder.write_i32_slice(&values);
            }
            Primitive::Int64 => {
                let values = self.collect_ints(prim, items, path)?;
                encoder.write_i64_slice(&values);
            }
            Primitive::Float32 => {
                let mut values = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let elem_path = format!("{path}[{index}]");
                    let v = item
                        .as_f64()
                        .ok_or_else(|| mismatch(&elem_path, "float32", item))?;
                    if v.is_finite() && v.abs() > f32::MAX as f64 {
                        return Err(FixtureError::out_of_range(&elem_path, prim, v).into());
                    }
                    values.push(v as f32);
                }
                encoder.write_f32_slice(&values);
            }
            Primitive::Float64 => {
                let mut values = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let v = item
                        .as_f64()
                        .ok_or_else(|| mismatch(&format!("{path}[{index}]"), "float64", item))?;
                    values.push(v);
                }
                encoder.write_f64_slice(&values);
            }
            Primitive::String => unreachable!("strings are not a bulk primitive"),
        }
        Ok(())
    }

    fn collect_ints(
        &self,
        prim: Primitive,
        items: &[Value],
        path: &str,
    ) -> Result<Vec<i64>, CodecError> {
        let mut values = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let elem_path = format!("{path}[{index}]");
            let v = item
                .as_i64()
                .ok_or_else(|| mismatch(&elem_path, prim.name(), item))?;
            values.push(check_int_range(&elem_path, prim, v)?);
        }
        Ok(values)
    }

    fn encode_struct(
        &self,
        name: &str,
        value: &Value,
        path: &str,
        encoder: &mut WireEncoder,
    ) -> Result<(), CodecError> {
        let decl = self
            .schema
            .get_struct(name)
            .ok_or_else(|| CodecError::UnknownType {
                name: name.to_string(),
            })?;
        let map = value
            .as_struct()
            .ok_or_else(|| mismatch(path, name, value))?;

        for key in map.keys() {
            if decl.get_field(key).is_none() {
                return Err(FixtureError::UnknownField {
                    field: format!("{path}.{key}"),
                }
                .into());
            }
        }

        for field in &decl.fields {
            let field_path = format!("{path}.{}", field.name);
            match map.get(&field.name) {
                Some(v) => self.encode_type(&field.ty, v, &field_path, encoder)?,
                None if field.is_optional() => encoder.write_presence(false),
                None => {
                    return Err(FixtureError::RequiredFieldMissing { field: field_path }.into());
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Decoding
    // ------------------------------------------------------------------

    fn decode_type(&self, ty: &WireType, cursor: &mut WireCursor) -> Result<Value, CodecError> {
        if ty.is_optional() && !cursor.read_presence()? {
            return Ok(Value::Null);
        }

        match ty {
            WireType::Primitive { prim, .. } => self.decode_primitive(*prim, cursor),
            WireType::Array { elem, .. } => self.decode_array(elem, cursor),
            WireType::Named { name, .. } => self.decode_struct(name, cursor),
        }
    }

    fn decode_primitive(
        &self,
        prim: Primitive,
        cursor: &mut WireCursor,
    ) -> Result<Value, CodecError> {
        let value = match prim {
            Primitive::Bool => Value::Bool(cursor.read_bool()?),
            Primitive::Int8 => Value::Int8(cursor.read_i8()?),
            Primitive::Int16 => Value::Int16(cursor.read_i16()?),
            Primitive::Int32 => Value::Int32(cursor.read_i32()?),
            Primitive::Int64 => Value::Int64(cursor.read_i64()?),
            Primitive::Float32 => Value::Float32(cursor.read_f32()?),
            Primitive::Float64 => Value::Float64(cursor.read_f64()?),
            Primitive::String => Value::String(cursor.read_string()?),
        };
        Ok(value)
    }

    fn decode_array(&self, elem: &WireType, cursor: &mut WireCursor) -> Result<Value, CodecError> {
        let len = cursor.read_len()?;

        if let Some(prim) = bulk_primitive(elem) {
            return self.decode_primitive_elements(prim, len, cursor);
        }

        // Allocation guard: never reserve more elements than could possibly
        // be decoded from the remaining bytes.
        let mut items = Vec::with_capacity(len.min(cursor.remaining()));
        for _ in 0..len {
            items.push(self.decode_type(elem, cursor)?);
        }
        Ok(Value::Array(items))
    }

    /// Decode an array of a fixed-width primitive through the bulk-copy path.
    fn decode_primitive_elements(
        &self,
        prim: Primitive,
        len: usize,
        cursor: &mut WireCursor,
    ) -> Result<Value, CodecError> {
        let items = match prim {
            Primitive::Bool => {
                cursor.check_elements(len, 1)?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(Value::Bool(cursor.read_bool()?));
                }
                items
            }
            Primitive::Int8 => {
                cursor.check_elements(len, 1)?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(Value::Int8(cursor.read_i8()?));
                }
                items
            }
            Primitive::Int16 => cursor
                .read_i16_slice(len)?
                .into_iter()
                .map(Value::Int16)
                .collect(),
            Primitive::Int32 => cursor
                .read_i32_slice(len)?
                .into_iter()
                .map(Value::Int32)
                .collect(),
            Primitive::Int64 => cursor
                .read_i64_slice(len)?
                .into_iter()
                .map(Value::Int64)
                .collect(),
            Primitive::Float32 => cursor
                .read_f32_slice(len)?
                .into_iter()
                .map(Value::Float32)
                .collect(),
            Primitive::Float64 => cursor
                .read_f64_slice(len)?
                .into_iter()
                .map(Value::Float64)
                .collect(),
            Primitive::String => unreachable!("strings are not a bulk primitive"),
        };
        Ok(Value::Array(items))
    }

    fn decode_struct(&self, name: &str, cursor: &mut WireCursor) -> Result<Value, CodecError> {
        let decl = self
            .schema
            .get_struct(name)
            .ok_or_else(|| CodecError::UnknownType {
                name: name.to_string(),
            })?;
        let mut map = FieldMap::with_capacity(decl.fields.len());
        for field in &decl.fields {
            let value = self.decode_type(&field.ty, cursor)?;
            map.insert(field.name.clone(), value);
        }
        Ok(Value::Struct(map))
    }
}

/// The element primitive when an array qualifies for the bulk path:
/// non-optional and fixed-width.
fn bulk_primitive(elem: &WireType) -> Option<Primitive> {
    match elem {
        WireType::Primitive {
            prim,
            optional: false,
        } if prim.size().is_some() => Some(*prim),
        _ => None,
    }
}

/// Range-check an integer against its declared primitive.
fn check_int_range(path: &str, prim: Primitive, v: i64) -> Result<i64, CodecError> {
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

fn mismatch(path: &str, expected: &str, value: &Value) -> CodecError {
    FixtureError::TypeMismatch {
        field: path.to_string(),
        expected: expected.to_string(),
        found: value.type_name().to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::load;

    fn struct_value(entries: &[(&str, Value)]) -> Value {
        Value::Struct(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_encode_config_struct() {
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
        .unwrap();
        let codec = MessageCodec::new(&schema, "ConfigMessage").unwrap();
        let value = struct_value(&[
            ("name", Value::String("test".to_string())),
            ("value", Value::Int32(42)),
        ]);
        let bytes = codec.encode(&value).unwrap();
        assert_eq!(
            bytes,
            vec![0x04, 0x00, b't', b'e', b's', b't', 0x2A, 0x00, 0x00, 0x00]
        );
        assert_eq!(codec.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_encode_int_array() {
        let schema = load("package demo\n\ntype IntList = []int32\n").unwrap();
        let codec = MessageCodec::new(&schema, "IntList").unwrap();
        let value = Value::Array(vec![Value::Int32(1), Value::Int32(2), Value::Int32(3)]);
        let bytes = codec.encode(&value).unwrap();
        assert_eq!(
            bytes,
            vec![
                0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00,
                0x00,
            ]
        );
        assert_eq!(codec.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_optional_present_and_absent() {
        let schema = load("package demo\n\ntype OptInt = *int32\n").unwrap();
        let codec = MessageCodec::new(&schema, "OptInt").unwrap();

        let bytes = codec.encode(&Value::Int32(42)).unwrap();
        assert_eq!(bytes, vec![0x01, 0x2A, 0x00, 0x00, 0x00]);
        assert_eq!(codec.decode(&bytes).unwrap(), Value::Int32(42));

        let bytes = codec.encode(&Value::Null).unwrap();
        assert_eq!(bytes, vec![0x00]);
        assert_eq!(codec.decode(&bytes).unwrap(), Value::Null);
    }

    #[test]
    fn test_nested_struct_is_inline() {
        let schema = load(
            r#"
package demo

type Inner struct {
    x int16
}

type Outer struct {
    inner Inner
    y     int32
}

type OuterMessage = Outer
"#,
        )
        .unwrap();
        let codec = MessageCodec::new(&schema, "OuterMessage").unwrap();
        let value = struct_value(&[
            ("inner", struct_value(&[("x", Value::Int16(1))])),
            ("y", Value::Int32(2)),
        ]);
        let bytes = codec.encode(&value).unwrap();
        assert_eq!(bytes, vec![0x01, 0x00, 0x02, 0x00, 0x00, 0x00]);
        assert_eq!(codec.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_decode_truncated_array() {
        let schema = load("package demo\n\ntype IntList = []int32\n").unwrap();
        let codec = MessageCodec::new(&schema, "IntList").unwrap();
        // Length claims 3 but only two elements follow.
        let bytes = [
            0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00,
        ];
        match codec.decode(&bytes).unwrap_err() {
            CodecError::Wire(WireError::InsufficientData {
                position,
                needed,
                have,
            }) => {
                assert_eq!(position, 10);
                assert_eq!(needed, 4);
                assert_eq!(have, 0);
            }
            other => panic!("expected insufficient data, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_invalid_optional_tag() {
        let schema = load("package demo\n\ntype OptInt = *int32\n").unwrap();
        let codec = MessageCodec::new(&schema, "OptInt").unwrap();
        match codec.decode(&[0x02]).unwrap_err() {
            CodecError::Wire(WireError::InvalidOptionalTag { position, value }) => {
                assert_eq!(position, 0);
                assert_eq!(value, 0x02);
            }
            other => panic!("expected invalid optional tag, got {other:?}"),
        }
    }

    #[test]
    fn test_message_not_found() {
        let schema = load("package demo\n\ntype OptInt = *int32\n").unwrap();
        let err = MessageCodec::new(&schema, "Missing").unwrap_err();
        assert_eq!(err.code(), "message-not-found");
    }

    #[test]
    fn test_encode_missing_required_field() {
        let schema = load(
            "package demo\n\ntype Config struct { name string\n value int32 }\n\ntype M = Config\n",
        )
        .unwrap();
        let codec = MessageCodec::new(&schema, "M").unwrap();
        let value = struct_value(&[("name", Value::String("x".to_string()))]);
        let err = codec.encode(&value).unwrap_err();
        assert_eq!(err.code(), "required-field-missing");
    }

    #[test]
    fn test_encode_missing_optional_field_writes_absence() {
        let schema = load(
            "package demo\n\ntype Config struct { note *string\n value int32 }\n\ntype M = Config\n",
        )
        .unwrap();
        let codec = MessageCodec::new(&schema, "M").unwrap();
        let value = struct_value(&[("value", Value::Int32(7))]);
        let bytes = codec.encode(&value).unwrap();
        assert_eq!(bytes, vec![0x00, 0x07, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_encode_unknown_field_rejected() {
        let schema =
            load("package demo\n\ntype Config struct { value int32 }\n\ntype M = Config\n")
                .unwrap();
        let codec = MessageCodec::new(&schema, "M").unwrap();
        let value = struct_value(&[("value", Value::Int32(7)), ("extra", Value::Int32(8))]);
        let err = codec.encode(&value).unwrap_err();
        assert_eq!(err.code(), "unknown-field");
    }

    #[test]
    fn test_encode_out_of_range_int() {
        let schema = load("package demo\n\ntype Tiny = int8\n").unwrap();
        let codec = MessageCodec::new(&schema, "Tiny").unwrap();
        let err = codec.encode(&Value::Int64(300)).unwrap_err();
        assert_eq!(err.code(), "int8-out-of-range");
    }

    #[test]
    fn test_encode_float32_overflow() {
        let schema = load("package demo\n\ntype Small = float32\n").unwrap();
        let codec = MessageCodec::new(&schema, "Small").unwrap();
        let err = codec.encode(&Value::Float64(1e300)).unwrap_err();
        assert_eq!(err.code(), "float32-out-of-range");
    }

    #[test]
    fn test_encode_type_mismatch() {
        let schema = load("package demo\n\ntype Answer = int32\n").unwrap();
        let codec = MessageCodec::new(&schema, "Answer").unwrap();
        let err = codec.encode(&Value::String("42".to_string())).unwrap_err();
        assert_eq!(err.code(), "type-mismatch");
    }

    #[test]
    fn test_encode_string_too_long() {
        let schema = load("package demo\n\ntype Name = string\n").unwrap();
        let codec = MessageCodec::new(&schema, "Name").unwrap();
        let long = "x".repeat(65536);
        let err = codec.encode(&Value::String(long)).unwrap_err();
        assert_eq!(err.code(), "string-too-long");
    }

    #[test]
    fn test_encode_array_too_long() {
        let schema = load("package demo\n\ntype Flags = []bool\n").unwrap();
        let codec = MessageCodec::new(&schema, "Flags").unwrap();
        let items = vec![Value::Bool(true); 65536];
        let err = codec.encode(&Value::Array(items)).unwrap_err();
        assert_eq!(err.code(), "array-too-long");
    }

    #[test]
    fn test_array_of_strings_round_trip() {
        let schema = load("package demo\n\ntype Names = []string\n").unwrap();
        let codec = MessageCodec::new(&schema, "Names").unwrap();
        let value = Value::Array(vec![
            Value::String("a".to_string()),
            Value::String("".to_string()),
            Value::String("long string with spaces".to_string()),
        ]);
        let bytes = codec.encode(&value).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_array_of_optionals_round_trip() {
        let schema = load("package demo\n\ntype Sparse = []*int32\n").unwrap();
        let codec = MessageCodec::new(&schema, "Sparse").unwrap();
        let value = Value::Array(vec![Value::Int32(1), Value::Null, Value::Int32(3)]);
        let bytes = codec.encode(&value).unwrap();
        assert_eq!(
            bytes,
            vec![
                0x03, 0x00, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x03, 0x00, 0x00, 0x00,
            ]
        );
        assert_eq!(codec.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_decode_hostile_length_does_not_allocate() {
        let schema = load("package demo\n\ntype Names = []string\n").unwrap();
        let codec = MessageCodec::new(&schema, "Names").unwrap();
        // Claims 65535 strings, provides two bytes.
        let bytes = [0xFF, 0xFF, 0x00, 0x00];
        assert!(codec.decode(&bytes).is_err());
    }

    #[test]
    fn test_decode_empty_input_on_struct() {
        let schema =
            load("package demo\n\ntype Config struct { value int32 }\n\ntype M = Config\n")
                .unwrap();
        let codec = MessageCodec::new(&schema, "M").unwrap();
        let err = codec.decode(&[]).unwrap_err();
        assert_eq!(err.code(), "insufficient-data");
    }

    #[test]
    fn test_float_round_trip_preserves_bits() {
        let schema = load("package demo\n\ntype Reading = float32\n").unwrap();
        let codec = MessageCodec::new(&schema, "Reading").unwrap();
        for v in [0.0f32, -0.0, 1.5, f32::MIN_POSITIVE, f32::MAX, f32::INFINITY] {
            let bytes = codec.encode(&Value::Float32(v)).unwrap();
            match codec.decode(&bytes).unwrap() {
                Value::Float32(out) => assert_eq!(out.to_bits(), v.to_bits()),
                other => panic!("expected float32, got {other:?}"),
            }
        }
    }
}
