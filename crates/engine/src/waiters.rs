// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronous "wait for this run to finish" support (`spec.md` §4.4),
//! mirroring `original_source/src/laminar.h`'s `Waiter` struct and
//! `Laminar::waitForRun`.

use crate::run::RunId;
use laminar_core::RunState;
use std::collections::HashMap;
use tokio::sync::oneshot;

#[derive(Default)]
pub struct Waiters {
    by_run: HashMap<RunId, Vec<oneshot::Sender<RunState>>>,
}

impl Waiters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in `id`'s completion, returning the receiving
    /// half. Several callers may wait on the same run.
    pub fn register(&mut self, id: RunId) -> oneshot::Receiver<RunState> {
        let (tx, rx) = oneshot::channel();
        self.by_run.entry(id).or_default().push(tx);
        rx
    }

    /// Wakes every waiter registered on `id` with the final result. A
    /// dropped receiver (the caller went away) is silently discarded.
    pub fn notify(&mut self, id: &RunId, result: RunState) {
        if let Some(senders) = self.by_run.remove(id) {
            for tx in senders {
                let _ = tx.send(result);
            }
        }
    }
}

#[cfg(test)]
#[path = "waiters_tests.rs"]
mod tests;
