// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The active-run set: one [`IndexMap`] keyed by identity plus one
//! [`HashMap`] for the reap-time pid lookup, per `SPEC_FULL.md`'s guidance
//! to model a multi-index set as a small struct of maps rather than reach
//! for a generic multi-index crate. Mirrors the role of `RunSet` in
//! `original_source/src/laminar.h`, minus the boost.multi_index machinery.

use crate::run::{Run, RunId};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Active runs: queued or running. A `Run` leaves this registry the moment
/// it completes — `laminar-storage` is the durable record from then on.
#[derive(Default)]
pub struct Registry {
    runs: IndexMap<RunId, Arc<Mutex<Run>>>,
    by_pid: HashMap<u32, RunId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a freshly queued run. Insertion order is FIFO admission
    /// order, which the scheduler relies on to assign fairly across jobs.
    pub fn insert(&mut self, run: Run) -> Arc<Mutex<Run>> {
        let handle = Arc::new(Mutex::new(run));
        let id = handle.lock().id.clone();
        self.runs.insert(id, handle.clone());
        handle
    }

    pub fn get(&self, id: &RunId) -> Option<Arc<Mutex<Run>>> {
        self.runs.get(id).cloned()
    }

    /// Runs in admission order, queued first. Iterating this and skipping
    /// non-pending entries is how the scheduler achieves round-robin
    /// fairness across jobs without a separate priority queue.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Mutex<Run>>> {
        self.runs.values()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Associates a pid with a run so a later reap notification can find
    /// it without the caller threading the `RunId` through the supervisor.
    pub fn bind_pid(&mut self, pid: u32, id: RunId) {
        self.by_pid.insert(pid, id);
    }

    /// Looks up and forgets the run bound to a pid, as the scheduler does
    /// once a script's exit status has been consumed.
    pub fn take_by_pid(&mut self, pid: u32) -> Option<RunId> {
        self.by_pid.remove(&pid)
    }

    /// Looks up the run bound to a pid without consuming the binding.
    pub fn pid_owner(&self, pid: u32) -> Option<RunId> {
        self.by_pid.get(&pid).cloned()
    }

    /// Drops a completed run from the active set.
    pub fn remove(&mut self, id: &RunId) -> Option<Arc<Mutex<Run>>> {
        self.runs.shift_remove(id)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
