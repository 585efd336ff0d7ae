// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state rebuilt by replaying the WAL.

use laminar_core::{JobName, RunState};
use std::collections::HashMap;

use crate::types::BuildRecord;
use crate::wal::StorageOp;

#[derive(Debug, Default)]
pub struct MaterializedState {
    /// Highest build number ever allocated per job, regardless of whether
    /// that build's record was ever written.
    pub counters: HashMap<JobName, u32>,
    pub builds: HashMap<(JobName, u32), BuildRecord>,
}

impl MaterializedState {
    pub fn replay(ops: Vec<StorageOp>) -> Self {
        let mut state = Self::default();
        for op in ops {
            state.apply(op);
        }
        state
    }

    pub fn apply(&mut self, op: StorageOp) {
        match op {
            StorageOp::BuildNumberAllocated { job, build } => {
                let entry = self.counters.entry(job).or_insert(0);
                if build > *entry {
                    *entry = build;
                }
            }
            StorageOp::BuildRecorded { record } => {
                self.counters
                    .entry(record.job.clone())
                    .and_modify(|n| *n = (*n).max(record.build))
                    .or_insert(record.build);
                self.builds.insert((record.job.clone(), record.build), record);
            }
        }
    }

    pub fn last_build_number(&self, job: &str) -> u32 {
        self.counters.get(job).copied().unwrap_or(0)
    }

    pub fn last_result(&self, job: &str) -> RunState {
        let Some(&max_build) = self.counters.get(job) else {
            return RunState::Unknown;
        };
        // The highest allocated build may not yet have a recorded result
        // (still running, or a crash before the write); walk downward to
        // the newest build that actually completed.
        (1..=max_build)
            .rev()
            .find_map(|b| self.builds.get(&(job.into(), b)))
            .map(|r| r.result)
            .unwrap_or(RunState::Unknown)
    }

    pub fn history(&self, job: &str, limit: usize) -> Vec<&BuildRecord> {
        let mut records: Vec<&BuildRecord> =
            self.builds.values().filter(|r| r.job == job).collect();
        records.sort_by_key(|r| std::cmp::Reverse(r.build));
        if limit > 0 {
            records.truncate(limit);
        }
        records
    }

    pub fn list_jobs(&self) -> Vec<JobName> {
        let mut names: Vec<JobName> = self.counters.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
