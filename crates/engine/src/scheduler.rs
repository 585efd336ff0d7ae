// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The scheduler: job admission, node assignment, and the step/reap/
//! complete cycle (`spec.md` §4.1, §4.2, §4.4). Pure and synchronous by
//! design — all blocking I/O (process spawning, file reads) is the
//! engine loop's job, driven by the [`Assignment`]s and
//! [`SchedulerAction`]s this module hands back.

use crate::hub::Hub;
use crate::node_table::NodeTable;
use crate::registry::Registry;
use crate::run::{Reason, Run, RunId};
use crate::waiters::Waiters;
use indexmap::IndexMap;
use laminar_core::{Clock, EngineError, JobConfig, JobName, NodeName, ParamMap, RunEvent, RunState};
use laminar_storage::{BuildRecord, Store};
use laminar_wire::{DashboardSnapshot, NodeSummary, RunSummary};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// A script ready to run, with its fully composed environment inputs.
pub struct Assignment {
    pub run_id: RunId,
    pub script: PathBuf,
    pub work_dir: PathBuf,
    pub env_files: Vec<PathBuf>,
    pub well_known: IndexMap<String, String>,
    pub params: ParamMap,
}

pub enum SchedulerAction {
    Spawn(Assignment),
    Completed { run_id: RunId, result: RunState },
}

pub struct Scheduler<C: Clock> {
    jobs: IndexMap<JobName, JobConfig>,
    nodes: NodeTable,
    registry: Registry,
    waiters: Waiters,
    hub: Hub,
    store: Arc<dyn Store>,
    clock: C,
    workspace_root: PathBuf,
    archive_root: PathBuf,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(
        jobs: IndexMap<JobName, JobConfig>,
        nodes: NodeTable,
        store: Arc<dyn Store>,
        clock: C,
        workspace_root: PathBuf,
        archive_root: PathBuf,
    ) -> Self {
        Self {
            jobs,
            nodes,
            registry: Registry::new(),
            waiters: Waiters::new(),
            hub: Hub::new(),
            store,
            clock,
            workspace_root,
            archive_root,
        }
    }

    /// Registers interest in `run_id`'s completion. If the run has already
    /// left the active registry, resolves immediately from the persisted
    /// record instead of waiting on a notification that will never come
    /// (`spec.md` §4.5).
    pub fn register_waiter(&mut self, run_id: RunId) -> tokio::sync::oneshot::Receiver<RunState> {
        if self.registry.get(&run_id).is_none() {
            if let Some(result) = self.store.build_result(&run_id.job, run_id.build) {
                let (tx, rx) = tokio::sync::oneshot::channel();
                let _ = tx.send(result);
                return rx;
            }
        }
        self.waiters.register(run_id)
    }

    /// Admits a new run for `job`, allocating its build number from the
    /// store. The run starts `Pending`; [`Self::assign_new_jobs`] gives it
    /// a node and its first script.
    pub fn queue_job(
        &mut self,
        job: &str,
        params: ParamMap,
        reason: Reason,
    ) -> Result<RunId, EngineError> {
        let config = self.jobs.get(job).ok_or_else(|| EngineError::UnknownJob(JobName::new(job)))?;
        let build = self
            .store
            .next_build_number(job)
            .map_err(|e| EngineError::StorageFailure(e.to_string()))?;
        let last_result = self.store.last_result(job);
        let id = RunId::new(config.name.clone(), build);
        let work_dir = self.workspace_root.join(job).join(build.to_string());

        let mut run = Run::new(id.clone(), work_dir, last_result, config.context.clone(), params, reason, self.clock.epoch_ms());
        for script in config.script_sequence() {
            run.push_script(script);
        }
        self.registry.insert(run);
        self.hub.publish(&RunEvent::Queued { job: id.job.clone(), build: id.build }, self.clock.epoch_ms());
        Ok(id)
    }

    /// Scans pending runs in admission order, handing each the first free
    /// node whose tags match (`spec.md` §4.1's "scan nodes in
    /// configuration order, first match wins").
    pub fn assign_new_jobs(&mut self) -> Vec<Assignment> {
        let pending: Vec<RunId> = self
            .registry
            .iter()
            .filter(|r| {
                let run = r.lock();
                run.state == RunState::Pending && run.node.is_none()
            })
            .map(|r| r.lock().id.clone())
            .collect();

        let mut assignments = Vec::new();
        for id in pending {
            let Some(config) = self.jobs.get(&id.job).cloned() else { continue };
            let Some(node) = self.nodes.find_available(&config.tags) else { continue };
            node.occupy();
            let node_name = node.name.clone();

            let Some(handle) = self.registry.get(&id) else { continue };
            let assignment = {
                let mut run = handle.lock();
                run.node = Some(node_name.clone());
                run.state = RunState::Running;
                run.started_at_ms = Some(self.clock.epoch_ms());
                let Some(script) = run.begin_next_script() else {
                    drop(run);
                    continue;
                };
                Assignment {
                    run_id: id.clone(),
                    script,
                    work_dir: run.work_dir.clone(),
                    env_files: run.env_files.clone(),
                    well_known: self.well_known_vars(&run, &node_name),
                    params: run.params.clone(),
                }
            };
            self.hub.publish(
                &RunEvent::Started { job: id.job.clone(), build: id.build, node: node_name },
                self.clock.epoch_ms(),
            );
            assignments.push(assignment);
        }
        assignments
    }

    fn well_known_vars(&self, run: &Run, node: &NodeName) -> IndexMap<String, String> {
        let mut vars = IndexMap::new();
        vars.insert("lBuildNum".to_string(), run.id.build.to_string());
        vars.insert("lJobName".to_string(), run.id.job.to_string());
        vars.insert("lNode".to_string(), node.to_string());
        vars.insert("lResult".to_string(), run.result.to_string());
        vars.insert("lLastResult".to_string(), run.last_result.to_string());
        vars.insert(
            "lWorkspace".to_string(),
            self.workspace_root.join(run.id.job.as_str()).join("workspace").display().to_string(),
        );
        vars.insert(
            "lArchive".to_string(),
            self.archive_root.join(run.id.job.as_str()).join(run.id.build.to_string()).display().to_string(),
        );
        vars
    }

    /// Records that `run_id`'s current script is now running as `pid`,
    /// called once the engine loop's [`crate::supervisor::Supervisor`]
    /// has actually spawned it.
    pub fn record_spawned(&mut self, run_id: &RunId, pid: u32) {
        if let Some(handle) = self.registry.get(run_id) {
            handle.lock().pid = Some(pid);
        }
        self.registry.bind_pid(pid, run_id.clone());
    }

    pub fn record_log(&mut self, run_id: &RunId, bytes: &[u8]) {
        if let Some(handle) = self.registry.get(run_id) {
            handle.lock().append_log(bytes);
        }
        self.hub.publish(
            &RunEvent::LogChunk { job: run_id.job.clone(), build: run_id.build, bytes: bytes.to_vec() },
            self.clock.epoch_ms(),
        );
    }

    /// A child has exited. Advances its run to the next script or, if
    /// none remain, completes it.
    pub fn on_reap(&mut self, pid: u32, status: i32) -> Option<SchedulerAction> {
        let run_id = self.registry.take_by_pid(pid)?;
        let handle = self.registry.get(&run_id)?;
        handle.lock().record_reap(pid, status);
        Some(self.advance(run_id, handle))
    }

    /// The supervisor could not even start the current script (e.g. the
    /// script file vanished between admission and exec). Treated as a
    /// failed script rather than a hard engine error so before/after
    /// scripts still run per the severity-escalation rule. Captures the
    /// same `[laminar] Failed to execute <path>` line into the run's log
    /// that a child which failed its own `exec` would have printed to its
    /// captured stderr (`spec.md` §4.3 Failure semantics).
    pub fn fail_current_script(&mut self, run_id: RunId, script: &std::path::Path) -> Option<SchedulerAction> {
        let handle = self.registry.get(&run_id)?;
        let line = format!("[laminar] Failed to execute {}\n", script.display());
        handle.lock().record_spawn_failure(line.as_bytes());
        self.hub.publish(
            &RunEvent::LogChunk { job: run_id.job.clone(), build: run_id.build, bytes: line.into_bytes() },
            self.clock.epoch_ms(),
        );
        Some(self.advance(run_id, handle))
    }

    fn advance(&mut self, run_id: RunId, handle: Arc<parking_lot::Mutex<Run>>) -> SchedulerAction {
        let next_script = handle.lock().begin_next_script();
        match next_script {
            Some(script) => {
                let run = handle.lock();
                let node = run.node.clone().unwrap_or_default();
                SchedulerAction::Spawn(Assignment {
                    run_id: run_id.clone(),
                    script,
                    work_dir: run.work_dir.clone(),
                    env_files: run.env_files.clone(),
                    well_known: self.well_known_vars(&run, &node),
                    params: run.params.clone(),
                })
            }
            None => self.complete(run_id),
        }
    }

    /// Escalates a run to `Aborted`. Returns `None` if `run_id` is not an
    /// active run. Otherwise returns the pid of its currently executing
    /// script, if any — the caller must kill that process for the abort
    /// to actually finish the run; a run with no script running yet (or
    /// between scripts) completes on its own on the next tick.
    pub fn abort(&mut self, run_id: &RunId) -> Option<Option<u32>> {
        let handle = self.registry.get(run_id)?;
        let pid = {
            let mut run = handle.lock();
            let pid = run.pid;
            run.abort();
            pid
        };
        if pid.is_none() {
            // Nothing to kill: no script in flight, so this completes
            // immediately instead of waiting on a reap that will never come.
            self.advance(run_id.clone(), handle);
        }
        Some(pid)
    }

    fn complete(&mut self, run_id: RunId) -> SchedulerAction {
        let handle = self.registry.remove(&run_id).expect("run_id came from the registry");
        let mut run = handle.lock();
        run.state = run.result;

        if let Some(node_name) = &run.node {
            if let Some(node) = self.nodes.get_mut(node_name) {
                node.release();
            }
        }

        let result = run.result;
        let now = self.clock.epoch_ms();
        let record = BuildRecord {
            job: run_id.job.clone(),
            build: run_id.build,
            node: run.node.clone().unwrap_or_default(),
            queued_at_ms: run.queued_at_ms,
            started_at_ms: run.started_at_ms.unwrap_or(run.queued_at_ms),
            completed_at_ms: now,
            result,
            reason: run.reason.to_string(),
            params: run.params.clone(),
            log_zstd: zstd_compress(&run.log),
        };
        drop(run);

        if let Err(error) = self.store.record_build(record) {
            tracing::error!(%run_id, %error, "failed to persist completed build, continuing anyway");
        }
        self.waiters.notify(&run_id, result);
        self.hub.publish(
            &RunEvent::Completed { job: run_id.job.clone(), build: run_id.build, state: result },
            now,
        );
        SchedulerAction::Completed { run_id, result }
    }

    /// Looks up which run owns a running pid, without consuming the
    /// binding the way [`Self::on_reap`] does — used for log chunks,
    /// which can arrive any number of times before the final reap.
    pub fn run_id_for_pid(&self, pid: u32) -> Option<RunId> {
        self.registry.pid_owner(pid)
    }

    pub fn subscribe_job(&mut self, job: JobName) -> tokio::sync::mpsc::Receiver<laminar_wire::StatusEvent> {
        self.hub.subscribe_job(job)
    }

    pub fn subscribe_log(&mut self, job: JobName, build: u32) -> tokio::sync::mpsc::Receiver<laminar_wire::StatusEvent> {
        let backlog = self.registry.get(&RunId::new(job.clone(), build)).map(|handle| {
            let run = handle.lock();
            laminar_wire::StatusEvent::Log {
                job: job.to_string(),
                build,
                chunk: String::from_utf8_lossy(&run.log).into_owned(),
                timestamp: self.clock.epoch_ms(),
            }
        });
        self.hub.subscribe_log(job, build, backlog)
    }

    pub fn subscribe_dashboard(&mut self) -> tokio::sync::mpsc::Receiver<DashboardSnapshot> {
        self.hub.subscribe_dashboard()
    }

    /// Builds a fresh dashboard view and fans it out to dashboard
    /// subscribers. Called on a timer by the engine loop.
    pub fn publish_dashboard_snapshot(&mut self) {
        let mut counts: HashMap<RunState, usize> = HashMap::new();
        let mut recent = Vec::new();
        for handle in self.registry.iter() {
            let run = handle.lock();
            *counts.entry(run.state).or_insert(0) += 1;
            recent.push(RunSummary {
                job: run.id.job.clone(),
                build: run.id.build,
                state: run.state,
                node: run.node.clone(),
                queued_at_ms: run.queued_at_ms,
                started_at_ms: run.started_at_ms,
            });
        }
        let nodes = self
            .nodes
            .iter()
            .map(|n| NodeSummary { name: n.name.clone(), num_executors: n.num_executors, busy_executors: n.busy_executors })
            .collect();
        let snapshot =
            DashboardSnapshot { counts_by_state: counts.into_iter().collect(), recent, nodes };
        self.hub.publish_dashboard(snapshot);
    }

    pub fn list_jobs(&self) -> Vec<JobName> {
        self.store.list_jobs()
    }

    pub fn history(&self, job: &str, limit: usize) -> Vec<BuildRecord> {
        self.store.history(job, limit)
    }

    pub fn get_log(&self, job: &str, build: u32) -> Result<Option<Vec<u8>>, laminar_storage::StoreError> {
        self.store.get_log(job, build)
    }

    /// Applies a config reload (`spec.md` §6): swaps in a freshly loaded
    /// job table and merges the node table (see [`NodeTable::reload`]).
    /// Runs already admitted are unaffected — only future `queue_job` and
    /// `assign_new_jobs` calls observe the new configuration.
    pub fn reload_config(&mut self, jobs: IndexMap<JobName, JobConfig>, nodes: impl IntoIterator<Item = laminar_core::Node>) {
        self.jobs = jobs;
        self.nodes.reload(nodes);
    }

    /// Number of runs still active (queued or running) — used by the
    /// engine's graceful-shutdown grace period to decide when to stop
    /// waiting.
    pub fn active_run_count(&self) -> usize {
        self.registry.len()
    }
}

fn zstd_compress(bytes: &[u8]) -> Vec<u8> {
    zstd::stream::encode_all(bytes, 0).unwrap_or_else(|_| bytes.to_vec())
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
