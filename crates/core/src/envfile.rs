// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser for the `KEY=VALUE` env-file format used by job/node/context
//! configuration and by the child environment composed for each script.

use indexmap::IndexMap;

/// Parse `KEY=VALUE` lines, preserving declaration order.
///
/// - `#` starts a comment (only when it is the first non-whitespace
///   character of the line — `#` inside a value is left alone).
/// - Blank lines are ignored.
/// - Leading/trailing whitespace around the whole line is trimmed.
/// - A single matching pair of surrounding `'` or `"` quotes on the value
///   is stripped.
/// - Lines without a top-level `=` are ignored.
pub fn parse_kv(contents: &str) -> IndexMap<String, String> {
    let mut out = IndexMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        out.insert(key.to_string(), strip_quotes(value.trim()));
    }
    out
}

fn strip_quotes(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' || first == b'\'') && first == last {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}

#[cfg(test)]
#[path = "envfile_tests.rs"]
mod tests;
