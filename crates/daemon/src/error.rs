// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level daemon errors. Every variant here is fatal at startup
//! (`spec.md` §7's `FatalConfigError`) — once the engine loop is running,
//! recoverable errors never propagate this far; they are logged or
//! turned into events inside `laminar-engine` instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("could not determine <home> directory; set LAMINAR_HOME")]
    NoHomeDir,

    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, #[source] source: std::io::Error },

    #[error(transparent)]
    Config(#[from] laminar_config::ConfigError),

    #[error(transparent)]
    Store(#[from] laminar_storage::StoreError),

    #[error("failed to install signal handler: {0}")]
    Signal(#[source] std::io::Error),
}
