// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-supplied build parameters.

use indexmap::IndexMap;

/// Case-sensitive string→string parameters attached to a `queueJob` call.
/// Order is preserved (insertion order) so environment composition is
/// deterministic; configuration and injected variables always win over a
/// param of the same key (see `laminar-engine::supervisor`).
pub type ParamMap = IndexMap<String, String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order() {
        let mut p = ParamMap::new();
        p.insert("b".to_string(), "2".to_string());
        p.insert("a".to_string(), "1".to_string());
        let keys: Vec<_> = p.keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn is_case_sensitive() {
        let mut p = ParamMap::new();
        p.insert("Key".to_string(), "1".to_string());
        assert!(p.get("key").is_none());
        assert_eq!(p.get("Key").map(String::as_str), Some("1"));
    }
}
