// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared by the scheduler and process supervisor.
//!
//! `NoNodeMatch` from `spec.md` §7 is deliberately absent here: it is not
//! an error, just the run staying `Pending`, and is represented by `Ok(None)`
//! at the call site rather than a variant of this enum.

use crate::job_config::JobName;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown job: {0}")]
    UnknownJob(JobName),

    #[error("failed to fork child for script {script}: {source}")]
    ForkFailed { script: String, #[source] source: std::io::Error },

    #[error("failed to exec script {script}: {source}")]
    ExecFailed { script: String, #[source] source: std::io::Error },

    #[error("subscriber buffer overflowed, disconnecting")]
    ClientOverflow,

    /// The persistent store rejected an operation the scheduler needed
    /// (e.g. allocating a build number). `laminar-storage`'s own error
    /// type lives in a crate above this one, so its message is carried
    /// here as text rather than nested.
    #[error("storage error: {0}")]
    StorageFailure(String),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
