// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use thiserror::Error;

/// `FatalConfigError` from `spec.md` §7: the only error class that aborts
/// startup rather than converting to an event or log line.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },

    #[error("node config {path} is missing EXECUTORS=")]
    MissingExecutors { path: PathBuf },

    #[error("node config {path} has invalid EXECUTORS value {value:?}: {source}")]
    InvalidExecutors { path: PathBuf, value: String, #[source] source: std::num::ParseIntError },

    #[error("job {job} references unknown context {context}")]
    UnknownContext { job: String, context: String },
}
