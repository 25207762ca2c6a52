// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Best-effort formatter post-pass.
//!
//! Generated source is piped through the target language's canonical
//! formatter when one is on PATH. Formatting is polish, not correctness: a
//! missing formatter, a spawn failure, or a non-zero exit downgrades to the
//! unformatted source with a warning, never an error.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::codegen::Target;

/// Format generated source with the target's native formatter.
///
/// Returns the formatted source, or the input unchanged when the formatter
/// is unavailable or fails.
pub fn format_source(target: Target, source: String) -> String {
    let (program, args): (&str, &[&str]) = match target {
        Target::Rust => ("rustfmt", &["--edition", "2021", "--emit", "stdout"]),
        Target::C => ("clang-format", &[]),
        Target::TypeScript => ("prettier", &["--parser", "typescript"]),
        Target::Python => ("black", &["--quiet", "-"]),
    };

    match run_formatter(program, args, &source) {
        Some(formatted) => formatted,
        None => {
            tracing::warn!(
                formatter = program,
                target = target.as_str(),
                "formatter unavailable or failed, emitting unformatted source"
            );
            source
        }
    }
}

/// Pipe `source` through a formatter subprocess. `None` on any failure.
fn run_formatter(program: &str, args: &[&str], source: &str) -> Option<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    child
        .stdin
        .take()?
        .write_all(source.as_bytes())
        .ok()?;

    let output = child.wait_with_output().ok()?;
    if !output.status.success() {
        return None;
    }
    let formatted = String::from_utf8(output.stdout).ok()?;
    if formatted.trim().is_empty() {
        return None;
    }
    Some(formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_formatter_returns_input() {
        let source = "fn main() {}\n".to_string();
        let result = run_formatter("fastwire-no-such-formatter", &[], &source);
        assert!(result.is_none());
    }

    #[test]
    fn test_format_source_never_loses_code() {
        // Whatever the environment, the output is either formatted or the
        // original, never empty.
        let source = "def f(  ):\n    return 1\n".to_string();
        let result = format_source(Target::Python, source.clone());
        assert!(!result.is_empty());
    }
}
