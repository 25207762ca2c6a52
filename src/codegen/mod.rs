// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Code generation.
//!
//! Produces, for one target language, a single source file implementing the
//! wire contract for every message in a schema: language-native type
//! declarations, private per-type helpers, and public
//! `Encode{Root}Message` / `Decode{Root}Message` entry points.
//!
//! The pipeline is deterministic: structs and messages are walked in
//! declaration order and the only map in play (the analyzer's TypeInfo map)
//! iterates sorted by name, so repeated runs emit byte-identical output.
//! Generation is all-or-nothing: any error aborts before a file is written.

pub mod c;
pub mod format;
pub mod naming;
pub mod python;
pub mod rust;
pub mod typescript;

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::core::GenerateError;
use crate::schema::{analyze, Message, Schema, TypeInfo, WireType, MAX_NESTING_DEPTH};

/// Target language selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Self-contained Rust backend (reference tier)
    Rust,
    /// C backend
    C,
    /// TypeScript backend
    TypeScript,
    /// Python backend
    Python,
}

impl Target {
    /// Parse a target name as given on the command line.
    pub fn parse(s: &str) -> Result<Self, GenerateError> {
        match s.to_lowercase().as_str() {
            "rust" | "rs" => Ok(Target::Rust),
            "c" => Ok(Target::C),
            "typescript" | "ts" => Ok(Target::TypeScript),
            "python" | "py" => Ok(Target::Python),
            _ => Err(GenerateError::UnsupportedTarget {
                name: s.to_string(),
            }),
        }
    }

    /// Canonical name of this target.
    pub fn as_str(self) -> &'static str {
        match self {
            Target::Rust => "rust",
            Target::C => "c",
            Target::TypeScript => "typescript",
            Target::Python => "python",
        }
    }

    /// Source file extension for this target.
    pub fn extension(self) -> &'static str {
        match self {
            Target::Rust => "rs",
            Target::C => "c",
            Target::TypeScript => "ts",
            Target::Python => "py",
        }
    }
}

impl std::str::FromStr for Target {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Target::parse(s)
    }
}

/// Options recognized by the generator.
///
/// `optimize`, `platform`, `arch`, and `no_compile` are recorded for the
/// native-compile collaborator that runs after generation; the core only
/// carries them through.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Selected emitter
    pub target: Target,
    /// Generated module/namespace name; defaults to the schema's package
    pub package: Option<String>,
    /// Root directory for emitted artefacts
    pub output_dir: PathBuf,
    /// Optimization hint (0-3) for the native-compile step
    pub optimize: u8,
    /// Target platform for the native-compile step; "current" is the host
    pub platform: String,
    /// Target architecture for the native-compile step
    pub arch: String,
    /// Suppress the native-compile step
    pub no_compile: bool,
}

impl GeneratorConfig {
    /// Create a config with defaults for one target.
    pub fn new(target: Target) -> Self {
        Self {
            target,
            package: None,
            output_dir: PathBuf::from("."),
            optimize: 2,
            platform: "current".to_string(),
            arch: "current".to_string(),
            no_compile: false,
        }
    }
}

/// A generated source file, not yet written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    /// File name (stem from the package, extension from the target)
    pub file_name: String,
    /// Complete source text
    pub source: String,
}

/// One public entry point: a message and its root type name.
pub struct MessageEntry<'a> {
    /// The message declaration
    pub message: &'a Message,
    /// Root type name used in the public API
    pub root: String,
}

/// Everything an emitter needs: the schema, the analyzer output, the
/// resolved namespace, and the deduplicated entry points.
pub struct GenContext<'a> {
    /// The validated schema
    pub schema: &'a Schema,
    /// Analyzer metadata, keyed by struct and message name
    pub infos: BTreeMap<String, TypeInfo>,
    /// Namespace for the generated module
    pub package: String,
    /// Messages in declaration order, one per distinct root name
    pub entries: Vec<MessageEntry<'a>>,
}

impl GenContext<'_> {
    /// The analyzer's size bound for a named type, clamped for use as an
    /// initial buffer capacity in emitted encoders.
    pub fn capacity_hint(&self, name: &str) -> usize {
        const MAX_HINT: u64 = 64 * 1024;
        self.infos
            .get(name)
            .and_then(|info| info.max_size)
            .map(|m| m.min(MAX_HINT) as usize)
            .unwrap_or(64)
    }
}

/// Generate source for a schema with the given configuration.
///
/// The output is routed through the target's canonical formatter when one is
/// available; otherwise the unformatted source is returned as-is.
pub fn generate(schema: &Schema, config: &GeneratorConfig) -> Result<GeneratedSource, GenerateError> {
    let ctx = build_context(schema, config)?;

    let raw = match config.target {
        Target::Rust => rust::emit(&ctx)?,
        Target::C => c::emit(&ctx)?,
        Target::TypeScript => typescript::emit(&ctx)?,
        Target::Python => python::emit(&ctx)?,
    };

    let source = format::format_source(config.target, raw);
    let file_name = format!(
        "{}.{}",
        naming::file_stem(&ctx.package),
        config.target.extension()
    );

    Ok(GeneratedSource { file_name, source })
}

/// Generate and write the source file under the configured output directory.
///
/// Returns the path of the written file.
pub fn generate_to_dir(
    schema: &Schema,
    config: &GeneratorConfig,
) -> Result<PathBuf, GenerateError> {
    let generated = generate(schema, config)?;

    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| GenerateError::file_create(config.output_dir.display().to_string(), &e))?;
    let path = config.output_dir.join(&generated.file_name);
    std::fs::write(&path, &generated.source)
        .map_err(|e| GenerateError::file_write(path.display().to_string(), &e))?;

    tracing::debug!(
        path = %path.display(),
        target = config.target.as_str(),
        "generated source written"
    );
    Ok(path)
}

/// Pre-pass: resolve names, compute TypeInfo, and check the generator's own
/// fatal conditions (empty schema, unresolved types, depth overflow).
fn build_context<'a>(
    schema: &'a Schema,
    config: &GeneratorConfig,
) -> Result<GenContext<'a>, GenerateError> {
    if schema.messages.is_empty() {
        return Err(GenerateError::EmptySchema);
    }

    for decl in &schema.structs {
        for field in &decl.fields {
            check_resolved(schema, &field.ty)?;
        }
    }
    for message in &schema.messages {
        check_resolved(schema, &message.target)?;
    }

    let infos = analyze(schema);
    for (name, info) in &infos {
        if info.nest_depth > MAX_NESTING_DEPTH {
            return Err(GenerateError::NestingDepthExceeded {
                name: name.clone(),
                limit: MAX_NESTING_DEPTH,
            });
        }
    }

    // One entry point per distinct root name: a second message landing on
    // the same root would redeclare the same public functions.
    let mut entries: Vec<MessageEntry<'a>> = Vec::with_capacity(schema.messages.len());
    for message in &schema.messages {
        let root = naming::root_type_name(&message.target);
        if entries.iter().any(|e| e.root == root) {
            tracing::warn!(
                name = message.name.as_str(),
                root = root.as_str(),
                "skipping message: root name already emitted"
            );
            continue;
        }
        entries.push(MessageEntry { message, root });
    }

    let package = config
        .package
        .clone()
        .unwrap_or_else(|| schema.package.clone());

    Ok(GenContext {
        schema,
        infos,
        package,
        entries,
    })
}

/// Build a context with default options, for emitter unit tests.
#[cfg(test)]
pub(crate) fn build_context_for_tests(schema: &Schema, target: Target) -> GenContext<'_> {
    build_context(schema, &GeneratorConfig::new(target)).expect("context")
}

fn check_resolved(schema: &Schema, ty: &WireType) -> Result<(), GenerateError> {
    match ty {
        WireType::Primitive { .. } => Ok(()),
        WireType::Array { elem, .. } => check_resolved(schema, elem),
        WireType::Named { name, .. } => {
            if schema.has_struct(name) {
                Ok(())
            } else if crate::core::Primitive::is_rejected_name(name) {
                Err(GenerateError::UnknownType { name: name.clone() })
            } else {
                Err(GenerateError::UnresolvedType { name: name.clone() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::load;

    #[test]
    fn test_target_parse() {
        assert_eq!(Target::parse("rust").unwrap(), Target::Rust);
        assert_eq!(Target::parse("TS").unwrap(), Target::TypeScript);
        assert_eq!(Target::parse("py").unwrap(), Target::Python);
        assert!(Target::parse("cobol").is_err());
    }

    #[test]
    fn test_generate_empty_schema() {
        let schema = Schema::new("demo");
        let config = GeneratorConfig::new(Target::Rust);
        let err = generate(&schema, &config).unwrap_err();
        assert_eq!(err.code(), "empty-schema");
    }

    #[test]
    fn test_generate_unresolved_type() {
        let mut schema = load("package demo\n\ntype M = int32\n").unwrap();
        schema.messages[0].target = WireType::named("Missing");
        let config = GeneratorConfig::new(Target::Rust);
        let err = generate(&schema, &config).unwrap_err();
        assert_eq!(err.code(), "unresolved-type");
    }

    #[test]
    fn test_context_dedupes_root_names() {
        let schema = load(
            "package demo\n\ntype A = int32\ntype B = []int32\n",
        )
        .unwrap();
        let config = GeneratorConfig::new(Target::Rust);
        let ctx = build_context(&schema, &config).unwrap();
        // Both messages root to Int32; only the first survives.
        assert_eq!(ctx.entries.len(), 1);
        assert_eq!(ctx.entries[0].message.name, "A");
    }

    #[test]
    fn test_context_package_override() {
        let schema = load("package demo\n\ntype M = int32\n").unwrap();
        let mut config = GeneratorConfig::new(Target::Python);
        config.package = Some("override".to_string());
        let ctx = build_context(&schema, &config).unwrap();
        assert_eq!(ctx.package, "override");
    }

    #[test]
    fn test_generated_file_name() {
        let schema = load("package deviceRegistry\n\ntype M = int32\n").unwrap();
        let config = GeneratorConfig::new(Target::Python);
        let generated = generate(&schema, &config).unwrap();
        assert_eq!(generated.file_name, "device_registry.py");
    }
}
