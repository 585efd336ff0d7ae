// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// `StorePersistenceError` from `spec.md` §7. The scheduler logs this and
/// still removes the Run from the active registry — the build number
/// stays consumed regardless of whether the write below it succeeded.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt record at line {line}: {source}")]
    Corrupt { line: usize, #[source] source: serde_json::Error },
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}
