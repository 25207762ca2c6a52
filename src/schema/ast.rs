// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! AST types for parsed wire schemas.
//!
//! A [`Schema`] is produced once by the parser, checked by the validator, and
//! immutable afterwards. Declaration order of structs, fields, and messages is
//! preserved; the generator and codec walk fields in that order.

use std::fmt;

use crate::core::Primitive;

/// A parsed schema: one package, its struct declarations, and its messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Package identifier (e.g., "sensors")
    pub package: String,
    /// Struct declarations, in declaration order
    pub structs: Vec<StructDecl>,
    /// Message aliases, in declaration order
    pub messages: Vec<Message>,
}

/// A named struct declaration with its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    /// Struct name
    pub name: String,
    /// Ordered list of fields
    pub fields: Vec<Field>,
}

/// A field in a struct declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Field type
    pub ty: WireType,
    /// Raw backtick tag, verbatim, if present
    pub tag: Option<String>,
    /// JSON key parsed out of the tag's `json:"..."` entry
    pub json_key: Option<String>,
}

/// A message alias marking a type as a root encodable unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Message name
    pub name: String,
    /// The aliased target type
    pub target: WireType,
}

/// Field type - primitive, array, or reference to a named struct.
///
/// Optionality lives on the type node: `*T` parses to the inner node with its
/// `optional` flag set.
#[derive(Debug, Clone, PartialEq)]
pub enum WireType {
    /// Primitive type
    Primitive {
        /// The wire primitive
        prim: Primitive,
        /// Whether a presence flag precedes the value
        optional: bool,
    },
    /// Length-prefixed array
    Array {
        /// Element type
        elem: Box<WireType>,
        /// Whether a presence flag precedes the array
        optional: bool,
    },
    /// Reference to a named struct
    Named {
        /// The referenced declaration name
        name: String,
        /// Whether a presence flag precedes the struct
        optional: bool,
    },
}

impl WireType {
    /// Construct a non-optional primitive node.
    pub fn primitive(prim: Primitive) -> Self {
        WireType::Primitive {
            prim,
            optional: false,
        }
    }

    /// Construct a non-optional array node.
    pub fn array(elem: WireType) -> Self {
        WireType::Array {
            elem: Box::new(elem),
            optional: false,
        }
    }

    /// Construct a non-optional named reference.
    pub fn named(name: impl Into<String>) -> Self {
        WireType::Named {
            name: name.into(),
            optional: false,
        }
    }

    /// Whether this type carries a presence flag.
    pub fn is_optional(&self) -> bool {
        match self {
            WireType::Primitive { optional, .. }
            | WireType::Array { optional, .. }
            | WireType::Named { optional, .. } => *optional,
        }
    }

    /// Return this type with its presence flag set.
    pub fn into_optional(self) -> Self {
        match self {
            WireType::Primitive { prim, .. } => WireType::Primitive {
                prim,
                optional: true,
            },
            WireType::Array { elem, .. } => WireType::Array {
                elem,
                optional: true,
            },
            WireType::Named { name, .. } => WireType::Named {
                name,
                optional: true,
            },
        }
    }

    /// The primitive, if this node is one.
    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            WireType::Primitive { prim, .. } => Some(*prim),
            _ => None,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_optional() {
            write!(f, "*")?;
        }
        match self {
            WireType::Primitive { prim, .. } => write!(f, "{prim}"),
            WireType::Array { elem, .. } => write!(f, "[]{elem}"),
            WireType::Named { name, .. } => write!(f, "{name}"),
        }
    }
}

impl Field {
    /// Create a field with no tag.
    pub fn new(name: impl Into<String>, ty: WireType) -> Self {
        Self {
            name: name.into(),
            ty,
            tag: None,
            json_key: None,
        }
    }

    /// Whether this field's type carries a presence flag.
    pub fn is_optional(&self) -> bool {
        self.ty.is_optional()
    }

    /// The JSON key this field maps to: the tag key when present, otherwise
    /// the field name.
    pub fn wire_key(&self) -> &str {
        self.json_key.as_deref().unwrap_or(&self.name)
    }
}

impl Schema {
    /// Create an empty schema for a package.
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            structs: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Look up a struct declaration by name.
    pub fn get_struct(&self, name: &str) -> Option<&StructDecl> {
        self.structs.iter().find(|s| s.name == name)
    }

    /// Look up a message by name.
    pub fn get_message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.name == name)
    }

    /// Whether a name refers to a declared struct.
    pub fn has_struct(&self, name: &str) -> bool {
        self.get_struct(name).is_some()
    }
}

impl StructDecl {
    /// Create an empty struct declaration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Look up a field by name.
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_type_optional() {
        let ty = WireType::primitive(Primitive::Int32);
        assert!(!ty.is_optional());
        let ty = ty.into_optional();
        assert!(ty.is_optional());
        assert_eq!(ty.as_primitive(), Some(Primitive::Int32));
    }

    #[test]
    fn test_wire_type_display() {
        let ty = WireType::array(WireType::primitive(Primitive::Int32));
        assert_eq!(ty.to_string(), "[]int32");
        let ty = WireType::named("Config").into_optional();
        assert_eq!(ty.to_string(), "*Config");
        let ty = WireType::array(WireType::array(WireType::primitive(Primitive::Float64)));
        assert_eq!(ty.to_string(), "[][]float64");
    }

    #[test]
    fn test_field_wire_key() {
        let mut field = Field::new("device_name", WireType::primitive(Primitive::String));
        assert_eq!(field.wire_key(), "device_name");
        field.json_key = Some("deviceName".to_string());
        assert_eq!(field.wire_key(), "deviceName");
    }

    #[test]
    fn test_schema_lookup() {
        let mut schema = Schema::new("sensors");
        schema.structs.push(StructDecl {
            name: "Config".to_string(),
            fields: vec![Field::new("value", WireType::primitive(Primitive::Int32))],
        });
        schema.messages.push(Message {
            name: "ConfigMessage".to_string(),
            target: WireType::named("Config"),
        });

        assert!(schema.has_struct("Config"));
        assert!(!schema.has_struct("Missing"));
        assert_eq!(
            schema.get_message("ConfigMessage").map(|m| &m.name),
            Some(&"ConfigMessage".to_string())
        );
        assert!(schema
            .get_struct("Config")
            .and_then(|s| s.get_field("value"))
            .is_some());
    }
}
