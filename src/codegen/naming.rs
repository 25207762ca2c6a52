// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Naming rules shared by every backend.
//!
//! The public API of generated code is named after a message's *root type*:
//! the base of its target expression with array and optional layers
//! stripped. `type M = []Device` exposes `EncodeDeviceMessage`;
//! `type M = Config` exposes `EncodeConfigMessage`; `type M = int32`
//! exposes `EncodeInt32Message`. Private helpers use each language's own
//! casing and never carry the `Message` suffix, so they cannot collide with
//! the public surface.

use heck::{ToSnakeCase, ToUpperCamelCase};

use crate::schema::WireType;

/// The root type name for a message target: the element type for arrays,
/// the struct name for references, the capitalized name for primitives.
pub fn root_type_name(target: &WireType) -> String {
    match target {
        WireType::Primitive { prim, .. } => prim.name().to_upper_camel_case(),
        WireType::Array { elem, .. } => root_type_name(elem),
        WireType::Named { name, .. } => name.clone(),
    }
}

/// Public encoder entry-point name for a root type.
pub fn encode_entry(root: &str) -> String {
    format!("Encode{root}Message")
}

/// Public decoder entry-point name for a root type.
pub fn decode_entry(root: &str) -> String {
    format!("Decode{root}Message")
}

/// Sanitize a package identifier into a file stem.
pub fn file_stem(package: &str) -> String {
    package.to_snake_case()
}

/// Map an identifier that could collide with a target-language keyword.
///
/// The IDL's identifier space is small; a trailing underscore is how every
/// backend sidesteps its reserved words.
pub fn escape_keyword(name: &str, keywords: &[&str]) -> String {
    if keywords.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Primitive;

    #[test]
    fn test_root_type_name_struct() {
        assert_eq!(root_type_name(&WireType::named("Config")), "Config");
    }

    #[test]
    fn test_root_type_name_array_uses_element() {
        let ty = WireType::array(WireType::named("Device"));
        assert_eq!(root_type_name(&ty), "Device");
    }

    #[test]
    fn test_root_type_name_primitive_is_capitalized() {
        assert_eq!(
            root_type_name(&WireType::primitive(Primitive::Int32)),
            "Int32"
        );
        assert_eq!(
            root_type_name(&WireType::primitive(Primitive::Float64)),
            "Float64"
        );
    }

    #[test]
    fn test_root_type_name_strips_optional_and_nesting() {
        let ty = WireType::array(WireType::array(
            WireType::primitive(Primitive::Int32).into_optional(),
        ));
        assert_eq!(root_type_name(&ty), "Int32");
    }

    #[test]
    fn test_entry_names() {
        assert_eq!(encode_entry("Config"), "EncodeConfigMessage");
        assert_eq!(decode_entry("Int32"), "DecodeInt32Message");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("deviceRegistry"), "device_registry");
        assert_eq!(file_stem("telemetry"), "telemetry");
    }

    #[test]
    fn test_escape_keyword() {
        assert_eq!(escape_keyword("type", &["type", "for"]), "type_");
        assert_eq!(escape_keyword("name", &["type", "for"]), "name");
    }
}
