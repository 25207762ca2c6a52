// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Dynamic value type system.
//!
//! Provides the unified value representation used by the fixture pipeline and
//! the reference wire codec: JSON fixtures parse into a [`Value`] tree, the
//! reference encoder walks that tree against the schema, and the reference
//! decoder produces one back. All variants are serde-serializable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Type alias for a decoded struct as field name -> value mapping.
pub type FieldMap = HashMap<String, Value>;

/// Unified value type for schema-typed data.
///
/// The variant universe mirrors the wire format's type universe: the eight
/// primitives, arrays, structs, and `Null` for absent optionals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// 8-bit signed integer
    Int8(i8),
    /// 16-bit signed integer
    Int16(i16),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 32-bit float
    Float32(f32),
    /// 64-bit float
    Float64(f64),
    /// UTF-8 string
    String(String),
    /// Array of values
    Array(Vec<Value>),
    /// Nested struct
    Struct(FieldMap),
    /// Absent optional
    Null,
}

impl Value {
    /// Check if this value is a numeric type (integers or floats).
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int8(_)
                | Value::Int16(_)
                | Value::Int32(_)
                | Value::Int64(_)
                | Value::Float32(_)
                | Value::Float64(_)
        )
    }

    /// Check if this value is an integer type.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Value::Int8(_) | Value::Int16(_) | Value::Int32(_) | Value::Int64(_)
        )
    }

    /// Check if this value is a floating-point type.
    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float32(_) | Value::Float64(_))
    }

    /// Check if this value is a container type (array or struct).
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Struct(_))
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to convert this value to i64 (for integer types only).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int8(v) => Some(*v as i64),
            Value::Int16(v) => Some(*v as i64),
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to convert this value to f64 (for numeric values only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int8(v) => Some(*v as f64),
            Value::Int16(v) => Some(*v as f64),
            Value::Int32(v) => Some(*v as f64),
            Value::Int64(v) => Some(*v as f64),
            Value::Float32(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the inner bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get the inner string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the inner array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to get the inner struct.
    pub fn as_struct(&self) -> Option<&FieldMap> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Get the type name of this value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int8(_) => "int8",
            Value::Int16(_) => "int16",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Null => "null",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int8(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "\"{v}\""),
            Value::Array(v) => write!(f, "[{} elements]", v.len()),
            Value::Struct(v) => write!(f, "{{{} fields}}", v.len()),
            Value::Null => write!(f, "null"),
        }
    }
}

// =============================================================================
// Primitive Type Enum
// =============================================================================

/// Primitive type identifiers for wire schemas.
///
/// The set is closed: these are the only primitives the wire format admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    /// Boolean, 1 byte
    Bool,
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 32-bit IEEE 754 float
    Float32,
    /// 64-bit IEEE 754 float
    Float64,
    /// Length-prefixed UTF-8 string
    String,
}

/// Maximum number of UTF-8 bytes in a string or elements in an array.
pub const MAX_LENGTH: usize = u16::MAX as usize;

/// Width of the uint16 length prefix on strings and arrays.
pub const LENGTH_PREFIX_SIZE: usize = 2;

impl Primitive {
    /// All primitives, in wire-name order.
    pub const ALL: [Primitive; 8] = [
        Primitive::Bool,
        Primitive::Int8,
        Primitive::Int16,
        Primitive::Int32,
        Primitive::Int64,
        Primitive::Float32,
        Primitive::Float64,
        Primitive::String,
    ];

    /// Get the encoded size in bytes for this primitive, if fixed.
    ///
    /// Strings are variable-length and return `None`.
    pub const fn size(self) -> Option<usize> {
        match self {
            Primitive::Bool | Primitive::Int8 => Some(1),
            Primitive::Int16 => Some(2),
            Primitive::Int32 | Primitive::Float32 => Some(4),
            Primitive::Int64 | Primitive::Float64 => Some(8),
            Primitive::String => None,
        }
    }

    /// Upper bound on the encoded size in bytes.
    ///
    /// For strings this is the length prefix plus the 65 535-byte ceiling.
    pub const fn max_size(self) -> usize {
        match self.size() {
            Some(n) => n,
            None => LENGTH_PREFIX_SIZE + MAX_LENGTH,
        }
    }

    /// Parse a primitive type from its wire name.
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s {
            "bool" => Some(Primitive::Bool),
            "int8" => Some(Primitive::Int8),
            "int16" => Some(Primitive::Int16),
            "int32" => Some(Primitive::Int32),
            "int64" => Some(Primitive::Int64),
            "float32" => Some(Primitive::Float32),
            "float64" => Some(Primitive::Float64),
            "string" => Some(Primitive::String),
            _ => None,
        }
    }

    /// Whether a name looks primitive but is outside the wire-legal set
    /// (unsigned widths, aliases from other IDLs). These get a dedicated
    /// error instead of reading as missing struct references.
    pub fn is_rejected_name(s: &str) -> bool {
        matches!(
            s,
            "uint8"
                | "uint16"
                | "uint32"
                | "uint64"
                | "byte"
                | "char"
                | "int"
                | "uint"
                | "float"
                | "double"
                | "float16"
                | "bytes"
        )
    }

    /// The wire name of this primitive.
    pub const fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Int8 => "int8",
            Primitive::Int16 => "int16",
            Primitive::Int32 => "int32",
            Primitive::Int64 => "int64",
            Primitive::Float32 => "float32",
            Primitive::Float64 => "float64",
            Primitive::String => "string",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_checking() {
        assert!(Value::Int32(42).is_numeric());
        assert!(Value::Int32(42).is_integer());
        assert!(Value::Float64(2.5).is_numeric());
        assert!(Value::Float64(2.5).is_float());
        assert!(!Value::Float64(2.5).is_integer());
        assert!(!Value::String("hello".to_string()).is_numeric());
        assert!(Value::Null.is_null());
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(Value::Int8(-5).as_i64(), Some(-5));
        assert_eq!(Value::Int32(42).as_i64(), Some(42));
        assert_eq!(Value::Float64(2.5).as_i64(), None);
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(Value::Int32(42).as_f64(), Some(42.0));
        assert_eq!(Value::Float32(2.5).as_f64(), Some(2.5f32 as f64));
        assert_eq!(Value::String("hello".to_string()).as_f64(), None);
    }

    #[test]
    fn test_as_str() {
        assert_eq!(Value::String("hello".to_string()).as_str(), Some("hello"));
        assert_eq!(Value::Int32(1).as_str(), None);
    }

    #[test]
    fn test_is_container() {
        assert!(Value::Array(vec![]).is_container());
        assert!(Value::Struct(HashMap::new()).is_container());
        assert!(!Value::Int32(1).is_container());
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Bool(true).type_name(), "bool");
        assert_eq!(Value::Int64(0).type_name(), "int64");
        assert_eq!(Value::Float32(0.0).type_name(), "float32");
        assert_eq!(Value::Array(vec![]).type_name(), "array");
        assert_eq!(Value::Null.type_name(), "null");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Value::Bool(true)), "true");
        assert_eq!(format!("{}", Value::Int32(42)), "42");
        assert_eq!(format!("{}", Value::String("test".to_string())), "\"test\"");
        assert_eq!(format!("{}", Value::Array(vec![])), "[0 elements]");
        assert_eq!(format!("{}", Value::Null), "null");
    }

    #[test]
    fn test_primitive_size() {
        assert_eq!(Primitive::Bool.size(), Some(1));
        assert_eq!(Primitive::Int8.size(), Some(1));
        assert_eq!(Primitive::Int16.size(), Some(2));
        assert_eq!(Primitive::Int32.size(), Some(4));
        assert_eq!(Primitive::Float32.size(), Some(4));
        assert_eq!(Primitive::Int64.size(), Some(8));
        assert_eq!(Primitive::Float64.size(), Some(8));
        assert_eq!(Primitive::String.size(), None);
    }

    #[test]
    fn test_primitive_max_size() {
        assert_eq!(Primitive::Int32.max_size(), 4);
        assert_eq!(Primitive::String.max_size(), 2 + 65535);
    }

    #[test]
    fn test_primitive_from_str() {
        assert_eq!(Primitive::try_from_str("int32"), Some(Primitive::Int32));
        assert_eq!(Primitive::try_from_str("float64"), Some(Primitive::Float64));
        assert_eq!(Primitive::try_from_str("uint32"), None);
        assert_eq!(Primitive::try_from_str("unknown"), None);
    }

    #[test]
    fn test_rejected_names() {
        assert!(Primitive::is_rejected_name("uint32"));
        assert!(Primitive::is_rejected_name("double"));
        assert!(!Primitive::is_rejected_name("int32"));
        assert!(!Primitive::is_rejected_name("Config"));
    }

    #[test]
    fn test_primitive_round_trip_names() {
        for prim in Primitive::ALL {
            assert_eq!(Primitive::try_from_str(prim.name()), Some(prim));
        }
    }

    #[test]
    fn test_serialization() {
        let value = Value::Int32(42);
        let json = serde_json::to_string(&value).unwrap();
        let decoded: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, value);
    }
}
