// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::path::Path;

use anyhow::Context;
use fastwire::schema::{self, Schema};

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Read, parse, and validate a schema file.
pub fn load_schema(path: &Path) -> Result<Schema> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema '{}'", path.display()))?;
    let schema = schema::load(&source)
        .with_context(|| format!("invalid schema '{}'", path.display()))?;
    Ok(schema)
}

/// Render a byte count with a binary-unit suffix.
pub fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

/// Render a hex dump with 16 bytes per line, offset-prefixed.
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::new();
    for (i, chunk) in data.chunks(16).enumerate() {
        out.push_str(&format!("{:08x}  {}\n", i * 16, hex::encode(chunk)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(10), "10 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MiB");
    }

    #[test]
    fn test_hex_dump_lines() {
        let dump = hex_dump(&[0xAB; 20]);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000000  "));
        assert!(lines[1].starts_with("00000010  "));
    }
}
