// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The immutable result of a config load (`spec.md` §2 "Config loader").

use indexmap::IndexMap;
use laminar_core::{JobConfig, JobName, Node};

/// One load of `<home>/cfg/{jobs,nodes,contexts}`. Consumed once at
/// startup and again on an explicit reload (`laminar-daemon`'s `SIGHUP`
/// handler); never mutated in place — a reload produces a brand new
/// snapshot that the caller swaps in.
#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    /// Job configurations in the sorted-by-filename order they were
    /// discovered in `<home>/cfg/jobs/`.
    pub jobs: IndexMap<JobName, JobConfig>,
    /// Node definitions in the sorted-by-filename order they were
    /// discovered in `<home>/cfg/nodes/` — the scheduler scans nodes in
    /// this order (`spec.md` §4.1).
    pub nodes: Vec<Node>,
}
