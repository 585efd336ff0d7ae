// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription fan-out (`spec.md` §4.5): dashboard, per-job, and
//! per-build-log subscribers, each a bounded channel. A subscriber that
//! cannot keep up is disconnected rather than allowed to slow the engine
//! loop down — `laminar_core::EngineError::ClientOverflow` names exactly
//! this policy.

use laminar_core::{JobName, RunEvent};
use laminar_wire::{DashboardSnapshot, StatusEvent};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::warn;

/// Bound on each subscriber's outstanding event queue. Past this, the
/// subscriber is considered stalled and disconnected.
const SUBSCRIBER_CAPACITY: usize = 256;

#[derive(Default)]
pub struct Hub {
    jobs: HashMap<JobName, Vec<mpsc::Sender<StatusEvent>>>,
    logs: HashMap<(JobName, u32), Vec<mpsc::Sender<StatusEvent>>>,
    dashboard: Vec<mpsc::Sender<DashboardSnapshot>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_job(&mut self, job: JobName) -> mpsc::Receiver<StatusEvent> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CAPACITY);
        self.jobs.entry(job).or_default().push(tx);
        rx
    }

    /// `backlog`, if given, is sent before the subscriber is registered
    /// for future chunks — the log follower's "full buffer captured so
    /// far, then an incremental stream" contract (`spec.md` §4.5).
    pub fn subscribe_log(
        &mut self,
        job: JobName,
        build: u32,
        backlog: Option<StatusEvent>,
    ) -> mpsc::Receiver<StatusEvent> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CAPACITY);
        if let Some(event) = backlog {
            let _ = tx.try_send(event);
        }
        self.logs.entry((job, build)).or_default().push(tx);
        rx
    }

    pub fn subscribe_dashboard(&mut self) -> mpsc::Receiver<DashboardSnapshot> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CAPACITY);
        self.dashboard.push(tx);
        rx
    }

    /// Converts and fans a lifecycle event out to every subscriber of the
    /// run's job and, if one is live, its specific build's log.
    pub fn publish(&mut self, event: &RunEvent, timestamp_ms: u64) {
        let status = StatusEvent::from_run_event(event, timestamp_ms);
        if let Some(subs) = self.jobs.get_mut(event.job()) {
            fan_out(subs, &status);
        }
        if let Some(subs) = self.logs.get_mut(&(event.job().clone(), event.build())) {
            fan_out(subs, &status);
        }
    }

    pub fn publish_dashboard(&mut self, snapshot: DashboardSnapshot) {
        self.dashboard.retain_mut(|tx| match tx.try_send(snapshot.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Closed(_)) => false,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("dashboard subscriber overflowed, disconnecting");
                false
            }
        });
    }
}

fn fan_out(subs: &mut Vec<mpsc::Sender<StatusEvent>>, event: &StatusEvent) {
    subs.retain_mut(|tx| match tx.try_send(event.clone()) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Closed(_)) => false,
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!("subscriber overflowed, disconnecting");
            false
        }
    });
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
