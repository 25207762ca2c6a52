// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema analysis.
//!
//! Computes per-type metadata ahead of encoding and generation. The encoder
//! uses `max_size` to pre-allocate its buffer; the generator uses the fixed
//! size and reach flags to pick fast paths (bulk array copies, exact-size
//! allocations) in emitted code.

use std::collections::{BTreeMap, HashSet};

use crate::core::{Primitive, LENGTH_PREFIX_SIZE, MAX_LENGTH};
use crate::schema::ast::{Schema, WireType};
use crate::schema::validator::MAX_NESTING_DEPTH;

/// Derived metadata for one named type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// True iff the type contains no strings, arrays, or optionals, recursively
    pub is_fixed_size: bool,
    /// Exact encoded byte count when `is_fixed_size`; 0 otherwise
    pub fixed_size: usize,
    /// Upper bound on the encoded byte count, with strings and arrays at
    /// their 65 535-unit ceilings; `None` when a cycle makes it unbounded.
    /// Saturates at `u64::MAX` rather than widening.
    pub max_size: Option<u64>,
    /// Whether a string is reachable from this type
    pub has_strings: bool,
    /// Whether an array is reachable from this type
    pub has_arrays: bool,
    /// Maximum recursive struct/array depth
    pub nest_depth: usize,
}

impl TypeInfo {
    fn primitive(prim: Primitive) -> Self {
        match prim.size() {
            Some(size) => TypeInfo {
                is_fixed_size: true,
                fixed_size: size,
                max_size: Some(size as u64),
                has_strings: false,
                has_arrays: false,
                nest_depth: 0,
            },
            None => TypeInfo {
                is_fixed_size: false,
                fixed_size: 0,
                max_size: Some((LENGTH_PREFIX_SIZE + MAX_LENGTH) as u64),
                has_strings: true,
                has_arrays: false,
                nest_depth: 0,
            },
        }
    }

    /// The info for a type re-entered during its own analysis: non-fixed,
    /// unbounded, depth capped.
    fn cyclic() -> Self {
        TypeInfo {
            is_fixed_size: false,
            fixed_size: 0,
            max_size: None,
            has_strings: false,
            has_arrays: false,
            nest_depth: MAX_NESTING_DEPTH,
        }
    }

    /// Demote to optional: one presence byte, never fixed-size.
    fn into_optional(mut self) -> Self {
        self.is_fixed_size = false;
        self.fixed_size = 0;
        self.max_size = self.max_size.map(|m| m.saturating_add(1));
        self
    }
}

/// Compute the TypeInfo map for a validated schema.
///
/// The map is keyed by declared struct name and by message name (a message's
/// entry describes its target type). `BTreeMap` keeps iteration order
/// deterministic for the generator.
pub fn analyze(schema: &Schema) -> BTreeMap<String, TypeInfo> {
    let mut analyzer = Analyzer {
        schema,
        infos: BTreeMap::new(),
        visiting: HashSet::new(),
    };

    for decl in &schema.structs {
        analyzer.struct_info(&decl.name);
    }
    for message in &schema.messages {
        let info = analyzer.type_info(&message.target);
        analyzer.infos.insert(message.name.clone(), info);
    }

    analyzer.infos
}

struct Analyzer<'a> {
    schema: &'a Schema,
    infos: BTreeMap<String, TypeInfo>,
    visiting: HashSet<String>,
}

impl Analyzer<'_> {
    /// Post-order info for a named struct, memoized by name.
    fn struct_info(&mut self, name: &str) -> TypeInfo {
        if let Some(info) = self.infos.get(name) {
            return info.clone();
        }
        if self.visiting.contains(name) {
            return TypeInfo::cyclic();
        }
        self.visiting.insert(name.to_string());

        let mut info = TypeInfo {
            is_fixed_size: true,
            fixed_size: 0,
            max_size: Some(0),
            has_strings: false,
            has_arrays: false,
            nest_depth: 0,
        };

        let schema = self.schema;
        if let Some(decl) = schema.get_struct(name) {
            for field in &decl.fields {
                let child = self.type_info(&field.ty);
                info.is_fixed_size &= child.is_fixed_size;
                info.fixed_size += child.fixed_size;
                info.max_size = match (info.max_size, child.max_size) {
                    (Some(a), Some(b)) => Some(a.saturating_add(b)),
                    _ => None,
                };
                info.has_strings |= child.has_strings;
                info.has_arrays |= child.has_arrays;
                info.nest_depth = info.nest_depth.max(child.nest_depth);
            }
        }
        info.nest_depth += 1;
        if !info.is_fixed_size {
            info.fixed_size = 0;
        }

        self.visiting.remove(name);
        self.infos.insert(name.to_string(), info.clone());
        info
    }

    /// Info for one type expression.
    fn type_info(&mut self, ty: &WireType) -> TypeInfo {
        match ty {
            WireType::Primitive { prim, optional } => {
                let info = TypeInfo::primitive(*prim);
                if *optional {
                    info.into_optional()
                } else {
                    info
                }
            }
            WireType::Array { elem, optional } => {
                let elem_info = self.type_info(elem);
                let max_size = elem_info.max_size.map(|elem_max| {
                    (LENGTH_PREFIX_SIZE as u64)
                        .saturating_add((MAX_LENGTH as u64).saturating_mul(elem_max))
                });
                let info = TypeInfo {
                    is_fixed_size: false,
                    fixed_size: 0,
                    max_size,
                    has_strings: elem_info.has_strings,
                    has_arrays: true,
                    nest_depth: elem_info.nest_depth + 1,
                };
                if *optional {
                    info.into_optional()
                } else {
                    info
                }
            }
            WireType::Named { name, optional } => {
                let info = self.struct_info(name);
                if *optional {
                    info.into_optional()
                } else {
                    info
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parser::parse;

    fn analyze_src(src: &str) -> BTreeMap<String, TypeInfo> {
        analyze(&parse(src).expect("parse"))
    }

    #[test]
    fn test_analyze_fixed_struct() {
        let infos = analyze_src(
            r#"
package demo

type Point struct {
    x int16
    y int32
    z float64
}

type PointMessage = Point
"#,
        );
        let info = &infos["Point"];
        assert!(info.is_fixed_size);
        assert_eq!(info.fixed_size, 2 + 4 + 8);
        assert_eq!(info.max_size, Some(14));
        assert!(!info.has_strings);
        assert!(!info.has_arrays);
        assert_eq!(info.nest_depth, 1);

        // The message entry mirrors its target.
        assert_eq!(infos["PointMessage"], infos["Point"]);
    }

    #[test]
    fn test_analyze_string_demotes_fixed() {
        let infos = analyze_src(
            r#"
package demo

type Config struct {
    name  string
    value int32
}

type ConfigMessage = Config
"#,
        );
        let info = &infos["Config"];
        assert!(!info.is_fixed_size);
        assert_eq!(info.fixed_size, 0);
        assert_eq!(info.max_size, Some(2 + 65535 + 4));
        assert!(info.has_strings);
        assert!(!info.has_arrays);
    }

    #[test]
    fn test_analyze_optional_adds_presence_byte() {
        let infos = analyze_src(
            r#"
package demo

type Holder struct {
    value *int32
}

type OptInt = *int32
type HolderMessage = Holder
"#,
        );
        let info = &infos["Holder"];
        assert!(!info.is_fixed_size);
        assert_eq!(info.max_size, Some(1 + 4));

        assert_eq!(infos["OptInt"].max_size, Some(5));
        assert!(!infos["OptInt"].is_fixed_size);
    }

    #[test]
    fn test_analyze_array_ceiling() {
        let infos = analyze_src(
            r#"
package demo

type IntList = []int32
"#,
        );
        let info = &infos["IntList"];
        assert!(!info.is_fixed_size);
        assert_eq!(info.max_size, Some(2 + 65535 * 4));
        assert!(info.has_arrays);
        assert!(!info.has_strings);
        assert_eq!(info.nest_depth, 1);
    }

    #[test]
    fn test_analyze_nested_struct_sums() {
        let infos = analyze_src(
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
        );
        let inner = &infos["Inner"];
        assert!(inner.is_fixed_size);
        assert_eq!(inner.fixed_size, 2);
        assert_eq!(inner.nest_depth, 1);

        let outer = &infos["Outer"];
        assert!(outer.is_fixed_size);
        assert_eq!(outer.fixed_size, 6);
        assert_eq!(outer.max_size, Some(6));
        assert_eq!(outer.nest_depth, 2);
    }

    #[test]
    fn test_analyze_string_array_reach_flags() {
        let infos = analyze_src(
            r#"
package demo

type Bundle struct {
    names []string
}

type BundleMessage = Bundle
"#,
        );
        let info = &infos["Bundle"];
        assert!(info.has_strings);
        assert!(info.has_arrays);
        assert_eq!(
            info.max_size,
            Some(2 + 65535u64 * (2 + 65535))
        );
        assert_eq!(info.nest_depth, 2);
    }

    #[test]
    fn test_analyze_deep_array_saturates() {
        // 16 nested arrays of strings overflow u64; the bound saturates
        // instead of wrapping.
        let mut ty = String::from("string");
        for _ in 0..16 {
            ty = format!("[]{ty}");
        }
        let infos = analyze_src(&format!(
            "package demo\n\ntype Deep struct {{ d {ty} }}\n\ntype DeepMessage = Deep\n"
        ));
        assert_eq!(infos["Deep"].max_size, Some(u64::MAX));
    }

    #[test]
    fn test_analyze_cycle_is_unbounded() {
        // The analyzer is exercised on unvalidated schemas in tooling paths,
        // so cyclic probing must terminate.
        let schema = parse(
            r#"
package demo

type Node struct {
    next Node
}

type NodeMessage = Node
"#,
        )
        .expect("parse");
        let infos = analyze(&schema);
        let info = &infos["Node"];
        assert!(!info.is_fixed_size);
        assert_eq!(info.max_size, None);
    }
}
