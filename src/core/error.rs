// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for fastwire.
//!
//! Errors are partitioned by origin:
//! - [`SchemaError`] - IDL parsing and schema validation
//! - [`WireError`] - wire-format decoding
//! - [`FixtureError`] - JSON fixture conversion
//! - [`GenerateError`] - code generation
//!
//! Every variant carries a stable machine-readable code (see `code()`) plus
//! the offending identifier or position, and is returned rather than thrown
//! across the public surface.

use std::fmt;

use crate::core::Primitive;

/// Errors produced while parsing or validating a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// IDL source failed to parse
    Parse {
        /// 1-based line of the failing construct
        line: usize,
        /// 1-based column of the failing construct
        column: usize,
        /// Parser message
        message: String,
    },

    /// Schema has an empty package identifier
    EmptyPackage,

    /// Schema declares no messages
    NoMessages,

    /// A message declaration has an empty name
    EmptyMessageName,

    /// A message or field names a target type that does not exist
    UndefinedType {
        /// The unresolved type name
        name: String,
        /// Where the reference appeared (message or struct field)
        referrer: String,
    },

    /// Two type declarations share a name
    DuplicateType {
        /// The colliding name
        name: String,
    },

    /// A struct declares no fields
    EmptyStruct {
        /// Struct name
        name: String,
    },

    /// A struct field has an empty name
    EmptyFieldName {
        /// Enclosing struct name
        type_name: String,
    },

    /// Two fields in one struct share a name
    DuplicateField {
        /// Enclosing struct name
        type_name: String,
        /// The colliding field name
        field: String,
    },

    /// A type participates in a reference cycle
    CircularReference {
        /// The type on which the cycle was re-entered
        name: String,
    },

    /// Struct/array nesting exceeds the wire-format ceiling
    MaxNestingDepth {
        /// The type at which the ceiling was crossed
        name: String,
        /// The allowed maximum
        limit: usize,
    },

    /// A primitive-looking name outside the closed wire-legal set
    UnknownType {
        /// The offending name
        name: String,
    },
}

impl SchemaError {
    /// Create a parse error at a source position.
    pub fn parse(line: usize, column: usize, message: impl Into<String>) -> Self {
        SchemaError::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create an undefined-type error.
    pub fn undefined_type(name: impl Into<String>, referrer: impl Into<String>) -> Self {
        SchemaError::UndefinedType {
            name: name.into(),
            referrer: referrer.into(),
        }
    }

    /// Create a duplicate-field error.
    pub fn duplicate_field(type_name: impl Into<String>, field: impl Into<String>) -> Self {
        SchemaError::DuplicateField {
            type_name: type_name.into(),
            field: field.into(),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::Parse { .. } => "parse-error",
            SchemaError::EmptyPackage => "empty-package",
            SchemaError::NoMessages => "no-messages",
            SchemaError::EmptyMessageName => "empty-message-name",
            SchemaError::UndefinedType { .. } => "undefined-type",
            SchemaError::DuplicateType { .. } => "duplicate-type",
            SchemaError::EmptyStruct { .. } => "empty-struct",
            SchemaError::EmptyFieldName { .. } => "empty-field-name",
            SchemaError::DuplicateField { .. } => "duplicate-field",
            SchemaError::CircularReference { .. } => "circular-reference",
            SchemaError::MaxNestingDepth { .. } => "max-nesting-depth",
            SchemaError::UnknownType { .. } => "unknown-type",
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            SchemaError::Parse {
                line,
                column,
                message,
            } => vec![
                ("line", line.to_string()),
                ("column", column.to_string()),
                ("message", message.clone()),
            ],
            SchemaError::EmptyPackage
            | SchemaError::NoMessages
            | SchemaError::EmptyMessageName => vec![],
            SchemaError::UndefinedType { name, referrer } => {
                vec![("type", name.clone()), ("referrer", referrer.clone())]
            }
            SchemaError::DuplicateType { name } => vec![("type", name.clone())],
            SchemaError::EmptyStruct { name } => vec![("type", name.clone())],
            SchemaError::EmptyFieldName { type_name } => vec![("type", type_name.clone())],
            SchemaError::DuplicateField { type_name, field } => {
                vec![("type", type_name.clone()), ("field", field.clone())]
            }
            SchemaError::CircularReference { name } => vec![("type", name.clone())],
            SchemaError::MaxNestingDepth { name, limit } => {
                vec![("type", name.clone()), ("limit", limit.to_string())]
            }
            SchemaError::UnknownType { name } => vec![("type", name.clone())],
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Parse {
                line,
                column,
                message,
            } => write!(f, "parse error at {line}:{column}: {message}"),
            SchemaError::EmptyPackage => write!(f, "schema has an empty package identifier"),
            SchemaError::NoMessages => write!(f, "schema declares no messages"),
            SchemaError::EmptyMessageName => write!(f, "message declaration has an empty name"),
            SchemaError::UndefinedType { name, referrer } => {
                write!(f, "undefined type '{name}' referenced by '{referrer}'")
            }
            SchemaError::DuplicateType { name } => write!(f, "duplicate type '{name}'"),
            SchemaError::EmptyStruct { name } => write!(f, "struct '{name}' has no fields"),
            SchemaError::EmptyFieldName { type_name } => {
                write!(f, "struct '{type_name}' has a field with an empty name")
            }
            SchemaError::DuplicateField { type_name, field } => {
                write!(f, "duplicate field '{field}' in struct '{type_name}'")
            }
            SchemaError::CircularReference { name } => {
                write!(f, "circular reference through type '{name}'")
            }
            SchemaError::MaxNestingDepth { name, limit } => {
                write!(
                    f,
                    "type '{name}' exceeds the maximum nesting depth of {limit}"
                )
            }
            SchemaError::UnknownType { name } => {
                write!(f, "unknown type '{name}' (not a wire-legal primitive)")
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// Errors produced while decoding wire-format bytes.
///
/// Decoders never panic on malformed input; every read validates bounds and
/// surfaces one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Fewer bytes remain than the next read requires
    InsufficientData {
        /// Byte offset at which the read was attempted
        position: usize,
        /// Bytes the read required
        needed: usize,
        /// Bytes actually remaining
        have: usize,
    },

    /// Optional presence flag was neither 0x00 nor 0x01
    InvalidOptionalTag {
        /// Byte offset of the flag
        position: usize,
        /// The flag value found
        value: u8,
    },

    /// String bytes were not valid UTF-8
    InvalidUtf8 {
        /// Byte offset where the string content started
        position: usize,
    },
}

impl WireError {
    /// Create an insufficient-data error.
    pub fn insufficient_data(position: usize, needed: usize, have: usize) -> Self {
        WireError::InsufficientData {
            position,
            needed,
            have,
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            WireError::InsufficientData { .. } => "insufficient-data",
            WireError::InvalidOptionalTag { .. } => "invalid-optional-tag",
            WireError::InvalidUtf8 { .. } => "invalid-utf8",
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            WireError::InsufficientData {
                position,
                needed,
                have,
            } => vec![
                ("position", position.to_string()),
                ("needed", needed.to_string()),
                ("have", have.to_string()),
            ],
            WireError::InvalidOptionalTag { position, value } => vec![
                ("position", position.to_string()),
                ("value", value.to_string()),
            ],
            WireError::InvalidUtf8 { position } => vec![("position", position.to_string())],
        }
    }
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::InsufficientData {
                position,
                needed,
                have,
            } => write!(
                f,
                "insufficient data at position {position}: needed {needed} bytes, have {have}"
            ),
            WireError::InvalidOptionalTag { position, value } => write!(
                f,
                "invalid optional tag 0x{value:02X} at position {position} (expected 0x00 or 0x01)"
            ),
            WireError::InvalidUtf8 { position } => {
                write!(f, "invalid UTF-8 in string at position {position}")
            }
        }
    }
}

impl std::error::Error for WireError {}

/// JSON value kind a fixture field was expected to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedKind {
    /// An integral JSON number
    Integer,
    /// Any JSON number
    Number,
    /// A JSON string
    String,
    /// A JSON object
    Object,
    /// A JSON array
    Array,
    /// A JSON true/false
    Bool,
}

impl ExpectedKind {
    /// Stable code fragment for this expectation.
    pub fn code(self) -> &'static str {
        match self {
            ExpectedKind::Integer => "integer-expected",
            ExpectedKind::Number => "number-expected",
            ExpectedKind::String => "string-expected",
            ExpectedKind::Object => "object-expected",
            ExpectedKind::Array => "array-expected",
            ExpectedKind::Bool => "bool-expected",
        }
    }

    /// Human-readable noun for messages.
    pub fn noun(self) -> &'static str {
        match self {
            ExpectedKind::Integer => "integer",
            ExpectedKind::Number => "number",
            ExpectedKind::String => "string",
            ExpectedKind::Object => "object",
            ExpectedKind::Array => "array",
            ExpectedKind::Bool => "boolean",
        }
    }
}

/// Errors produced while converting JSON fixtures to wire bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum FixtureError {
    /// The requested message name is not declared in the schema
    MessageNotFound {
        /// The message name looked up
        message: String,
    },

    /// The input was not valid JSON
    InvalidJson {
        /// Parser message
        message: String,
    },

    /// A non-optional field had no JSON key
    RequiredFieldMissing {
        /// Field path (e.g. "config.name")
        field: String,
    },

    /// The JSON object carried a key no field maps to
    UnknownField {
        /// Field path of the extra key
        field: String,
    },

    /// A JSON value had the wrong kind for its field
    Expected {
        /// Field path
        field: String,
        /// What the schema required
        expected: ExpectedKind,
        /// What the JSON held
        found: String,
    },

    /// A schema/value shape mismatch outside the JSON-kind cases
    TypeMismatch {
        /// Field path
        field: String,
        /// Expected type rendering
        expected: String,
        /// Found value rendering
        found: String,
    },

    /// A numeric value fell outside its primitive's range
    OutOfRange {
        /// Field path
        field: String,
        /// The declared primitive
        primitive: Primitive,
        /// The offending value, rendered
        value: String,
    },

    /// A string exceeded the 65 535-byte wire ceiling
    StringTooLong {
        /// Field path
        field: String,
        /// Actual UTF-8 byte length
        length: usize,
    },

    /// An array exceeded the 65 535-element wire ceiling
    ArrayTooLong {
        /// Field path
        field: String,
        /// Actual element count
        length: usize,
    },
}

impl FixtureError {
    /// Create a wrong-JSON-kind error.
    pub fn expected(
        field: impl Into<String>,
        expected: ExpectedKind,
        found: impl Into<String>,
    ) -> Self {
        FixtureError::Expected {
            field: field.into(),
            expected,
            found: found.into(),
        }
    }

    /// Create an out-of-range error.
    pub fn out_of_range(
        field: impl Into<String>,
        primitive: Primitive,
        value: impl fmt::Display,
    ) -> Self {
        FixtureError::OutOfRange {
            field: field.into(),
            primitive,
            value: value.to_string(),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            FixtureError::MessageNotFound { .. } => "message-not-found",
            FixtureError::InvalidJson { .. } => "invalid-json",
            FixtureError::RequiredFieldMissing { .. } => "required-field-missing",
            FixtureError::UnknownField { .. } => "unknown-field",
            FixtureError::Expected { expected, .. } => expected.code(),
            FixtureError::TypeMismatch { .. } => "type-mismatch",
            FixtureError::OutOfRange { primitive, .. } => match primitive {
                Primitive::Int8 => "int8-out-of-range",
                Primitive::Int16 => "int16-out-of-range",
                Primitive::Int32 => "int32-out-of-range",
                Primitive::Int64 => "int64-out-of-range",
                Primitive::Float32 => "float32-out-of-range",
                Primitive::Float64 => "float64-out-of-range",
                Primitive::Bool | Primitive::String => "number-out-of-range",
            },
            FixtureError::StringTooLong { .. } => "string-too-long",
            FixtureError::ArrayTooLong { .. } => "array-too-long",
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            FixtureError::MessageNotFound { message } => vec![("message", message.clone())],
            FixtureError::InvalidJson { message } => vec![("message", message.clone())],
            FixtureError::RequiredFieldMissing { field } => vec![("field", field.clone())],
            FixtureError::UnknownField { field } => vec![("field", field.clone())],
            FixtureError::Expected {
                field,
                expected,
                found,
            } => vec![
                ("field", field.clone()),
                ("expected", expected.noun().to_string()),
                ("found", found.clone()),
            ],
            FixtureError::TypeMismatch {
                field,
                expected,
                found,
            } => vec![
                ("field", field.clone()),
                ("expected", expected.clone()),
                ("found", found.clone()),
            ],
            FixtureError::OutOfRange {
                field,
                primitive,
                value,
            } => vec![
                ("field", field.clone()),
                ("primitive", primitive.to_string()),
                ("value", value.clone()),
            ],
            FixtureError::StringTooLong { field, length } => {
                vec![("field", field.clone()), ("length", length.to_string())]
            }
            FixtureError::ArrayTooLong { field, length } => {
                vec![("field", field.clone()), ("length", length.to_string())]
            }
        }
    }
}

impl fmt::Display for FixtureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureError::MessageNotFound { message } => {
                write!(f, "message '{message}' not found in schema")
            }
            FixtureError::InvalidJson { message } => write!(f, "invalid JSON: {message}"),
            FixtureError::RequiredFieldMissing { field } => {
                write!(f, "required field '{field}' missing")
            }
            FixtureError::UnknownField { field } => {
                write!(f, "unknown field '{field}' in JSON input")
            }
            FixtureError::Expected {
                field,
                expected,
                found,
            } => write!(
                f,
                "field '{field}': expected {}, found {found}",
                expected.noun()
            ),
            FixtureError::TypeMismatch {
                field,
                expected,
                found,
            } => write!(f, "field '{field}': expected {expected}, found {found}"),
            FixtureError::OutOfRange {
                field,
                primitive,
                value,
            } => write!(
                f,
                "field '{field}': value {value} out of range for {primitive}"
            ),
            FixtureError::StringTooLong { field, length } => write!(
                f,
                "field '{field}': string of {length} bytes exceeds the 65535-byte limit"
            ),
            FixtureError::ArrayTooLong { field, length } => write!(
                f,
                "field '{field}': array of {length} elements exceeds the 65535-element limit"
            ),
        }
    }
}

impl std::error::Error for FixtureError {}

/// Errors produced by the code generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// The schema has no types and no messages to generate for
    EmptySchema,

    /// A primitive-looking name outside the closed wire-legal set
    UnknownType {
        /// The offending name
        name: String,
    },

    /// A type reference that did not resolve during generation
    UnresolvedType {
        /// The unresolved name
        name: String,
    },

    /// Type nesting exceeded the generator's walk limit
    NestingDepthExceeded {
        /// The type at which the limit was crossed
        name: String,
        /// The allowed maximum
        limit: usize,
    },

    /// The requested target language has no emitter
    UnsupportedTarget {
        /// The requested target name
        name: String,
    },

    /// Creating an output file failed
    FileCreate {
        /// Target path
        path: String,
        /// OS error rendering
        message: String,
    },

    /// Writing an output file failed
    FileWrite {
        /// Target path
        path: String,
        /// OS error rendering
        message: String,
    },
}

impl GenerateError {
    /// Create a file-create error from an I/O error.
    pub fn file_create(path: impl Into<String>, err: &std::io::Error) -> Self {
        GenerateError::FileCreate {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Create a file-write error from an I/O error.
    pub fn file_write(path: impl Into<String>, err: &std::io::Error) -> Self {
        GenerateError::FileWrite {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            GenerateError::EmptySchema => "empty-schema",
            GenerateError::UnknownType { .. } => "unknown-type",
            GenerateError::UnresolvedType { .. } => "unresolved-type",
            GenerateError::NestingDepthExceeded { .. } => "max-nesting-depth",
            GenerateError::UnsupportedTarget { .. } => "unsupported-target",
            GenerateError::FileCreate { .. } => "file-create",
            GenerateError::FileWrite { .. } => "file-write",
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            GenerateError::EmptySchema => vec![],
            GenerateError::UnknownType { name } => vec![("type", name.clone())],
            GenerateError::UnresolvedType { name } => vec![("type", name.clone())],
            GenerateError::NestingDepthExceeded { name, limit } => {
                vec![("type", name.clone()), ("limit", limit.to_string())]
            }
            GenerateError::UnsupportedTarget { name } => vec![("target", name.clone())],
            GenerateError::FileCreate { path, message }
            | GenerateError::FileWrite { path, message } => {
                vec![("path", path.clone()), ("message", message.clone())]
            }
        }
    }
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::EmptySchema => write!(f, "schema is empty, nothing to generate"),
            GenerateError::UnknownType { name } => {
                write!(f, "unknown type '{name}' in generator input")
            }
            GenerateError::UnresolvedType { name } => {
                write!(f, "unresolved type '{name}' in generator input")
            }
            GenerateError::NestingDepthExceeded { name, limit } => {
                write!(f, "type '{name}' exceeds generator nesting limit of {limit}")
            }
            GenerateError::UnsupportedTarget { name } => {
                write!(f, "unsupported target language '{name}'")
            }
            GenerateError::FileCreate { path, message } => {
                write!(f, "failed to create '{path}': {message}")
            }
            GenerateError::FileWrite { path, message } => {
                write!(f, "failed to write '{path}': {message}")
            }
        }
    }
}

impl std::error::Error for GenerateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_codes() {
        assert_eq!(SchemaError::EmptyPackage.code(), "empty-package");
        assert_eq!(SchemaError::NoMessages.code(), "no-messages");
        assert_eq!(
            SchemaError::CircularReference {
                name: "Node".to_string()
            }
            .code(),
            "circular-reference"
        );
        assert_eq!(
            SchemaError::MaxNestingDepth {
                name: "Deep".to_string(),
                limit: 32
            }
            .code(),
            "max-nesting-depth"
        );
        assert_eq!(
            SchemaError::UnknownType {
                name: "uint32".to_string()
            }
            .code(),
            "unknown-type"
        );
    }

    #[test]
    fn test_wire_error_display() {
        let err = WireError::insufficient_data(10, 4, 0);
        assert_eq!(
            err.to_string(),
            "insufficient data at position 10: needed 4 bytes, have 0"
        );
        assert_eq!(err.code(), "insufficient-data");
    }

    #[test]
    fn test_wire_error_log_fields() {
        let err = WireError::InvalidOptionalTag {
            position: 0,
            value: 0x02,
        };
        let fields = err.log_fields();
        assert_eq!(fields[0], ("position", "0".to_string()));
        assert_eq!(fields[1], ("value", "2".to_string()));
    }

    #[test]
    fn test_fixture_expected_codes() {
        let err = FixtureError::expected("value", ExpectedKind::Integer, "\"oops\"");
        assert_eq!(err.code(), "integer-expected");
        let err = FixtureError::expected("flag", ExpectedKind::Bool, "\"true\"");
        assert_eq!(err.code(), "bool-expected");
    }

    #[test]
    fn test_fixture_out_of_range_codes() {
        let err = FixtureError::out_of_range("value", Primitive::Int8, 300);
        assert_eq!(err.code(), "int8-out-of-range");
        let err = FixtureError::out_of_range("value", Primitive::Int32, 1i64 << 40);
        assert_eq!(err.code(), "int32-out-of-range");
    }

    #[test]
    fn test_generate_error_codes() {
        assert_eq!(GenerateError::EmptySchema.code(), "empty-schema");
        assert_eq!(
            GenerateError::UnsupportedTarget {
                name: "cobol".to_string()
            }
            .code(),
            "unsupported-target"
        );
        assert_eq!(
            GenerateError::UnknownType {
                name: "byte".to_string()
            }
            .code(),
            "unknown-type"
        );
    }
}
