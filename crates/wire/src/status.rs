// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status overview and lifecycle event DTOs, per `spec.md` §6.

use laminar_core::{JobName, NodeName, RunEvent, RunState};
use serde::{Deserialize, Serialize};

/// The logical, transport-neutral wire event from `spec.md` §6:
/// `{type, job, build, node?, state?, chunk?, timestamp}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusEvent {
    Queued { job: String, build: u32, timestamp: u64 },
    Started { job: String, build: u32, node: String, timestamp: u64 },
    Log { job: String, build: u32, chunk: String, timestamp: u64 },
    Completed { job: String, build: u32, state: RunState, timestamp: u64 },
}

impl StatusEvent {
    /// Stamp a core [`RunEvent`] with a wall-clock timestamp for the wire.
    /// Non-UTF-8 log bytes are lossily converted — the raw bytes remain
    /// authoritative in the stored log, this is only the live-tail view.
    pub fn from_run_event(event: &RunEvent, timestamp_ms: u64) -> Self {
        match event {
            RunEvent::Queued { job, build } => {
                StatusEvent::Queued { job: job.to_string(), build: *build, timestamp: timestamp_ms }
            }
            RunEvent::Started { job, build, node } => StatusEvent::Started {
                job: job.to_string(),
                build: *build,
                node: node.to_string(),
                timestamp: timestamp_ms,
            },
            RunEvent::LogChunk { job, build, bytes } => StatusEvent::Log {
                job: job.to_string(),
                build: *build,
                chunk: String::from_utf8_lossy(bytes).into_owned(),
                timestamp: timestamp_ms,
            },
            RunEvent::Completed { job, build, state } => StatusEvent::Completed {
                job: job.to_string(),
                build: *build,
                state: *state,
                timestamp: timestamp_ms,
            },
        }
    }
}

/// One row of the dashboard's "recent/running" view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub job: JobName,
    pub build: u32,
    pub state: RunState,
    pub node: Option<NodeName>,
    pub queued_at_ms: u64,
    pub started_at_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeSummary {
    pub name: NodeName,
    pub num_executors: u32,
    pub busy_executors: u32,
}

/// Periodic snapshot delivered to dashboard-scoped subscribers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DashboardSnapshot {
    pub counts_by_state: Vec<(RunState, usize)>,
    pub recent: Vec<RunSummary>,
    pub nodes: Vec<NodeSummary>,
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
