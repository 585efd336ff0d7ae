// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The mutable state of one job execution (`spec.md` §3, §4.2).

use laminar_core::{JobName, NodeName, ParamMap, RunState};
use std::collections::VecDeque;
use std::path::PathBuf;

/// `(jobName, buildNum)` — the canonical key of a [`Run`], matching the
/// composite key in `original_source/src/run.h`'s `_run_index`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunId {
    pub job: JobName,
    pub build: u32,
}

impl RunId {
    pub fn new(job: JobName, build: u32) -> Self {
        Self { job, build }
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.job, self.build)
    }
}

/// Why this run was queued — either an upstream trigger or a free-text reason.
#[derive(Debug, Clone, Default)]
pub enum Reason {
    #[default]
    None,
    Upstream { job: JobName, build: u32 },
    Message(String),
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reason::None => Ok(()),
            Reason::Upstream { job, build } => write!(f, "Triggered by upstream {job} #{build}"),
            Reason::Message(msg) => write!(f, "{msg}"),
        }
    }
}

/// One execution of a job. Never copied — shared via `Arc<Mutex<Run>>` in
/// the registry, as `original_source/src/run.h` documents of its own
/// `std::shared_ptr<Run>`.
#[derive(Debug)]
pub struct Run {
    pub id: RunId,
    pub state: RunState,
    pub result: RunState,
    pub last_result: RunState,
    pub node: Option<NodeName>,
    pub work_dir: PathBuf,
    pub scripts_remaining: VecDeque<PathBuf>,
    pub current_script: Option<PathBuf>,
    pub env_files: Vec<PathBuf>,
    pub params: ParamMap,
    pub pid: Option<u32>,
    pub proc_status: Option<i32>,
    pub log: Vec<u8>,
    pub queued_at_ms: u64,
    pub started_at_ms: Option<u64>,
    pub reason: Reason,
}

impl Run {
    pub fn new(
        id: RunId,
        work_dir: PathBuf,
        last_result: RunState,
        env_files: Vec<PathBuf>,
        params: ParamMap,
        reason: Reason,
        queued_at_ms: u64,
    ) -> Self {
        Self {
            id,
            state: RunState::Pending,
            result: RunState::Success,
            last_result,
            node: None,
            work_dir,
            scripts_remaining: VecDeque::new(),
            current_script: None,
            env_files,
            params,
            pid: None,
            proc_status: None,
            log: Vec::new(),
            queued_at_ms,
            started_at_ms: None,
            reason,
        }
    }

    pub fn push_script(&mut self, script: PathBuf) {
        self.scripts_remaining.push_back(script);
    }

    pub fn push_env(&mut self, path: PathBuf) {
        self.env_files.push(path);
    }

    pub fn append_log(&mut self, bytes: &[u8]) {
        self.log.extend_from_slice(bytes);
    }

    /// Record a reaped child's exit status against the script that was
    /// executing, escalating `result` if it failed. Mirrors
    /// `original_source/src/run.cpp::step`'s
    /// `if (!currentScript.empty() && procStatus != 0) result = FAILED;`
    /// evaluated on the *next* call, before the next script is popped.
    fn escalate_for_last_script(&mut self) {
        if self.current_script.is_some() {
            if let Some(status) = self.proc_status {
                if status != 0 {
                    self.result = self.result.escalate(RunState::Failed);
                }
            }
        }
    }

    /// Pop the next script to run, if any, escalating the result for the
    /// script that just finished first. Returns `None` once every
    /// configured script (before/main/after) has run — the caller should
    /// then complete the Run.
    pub fn begin_next_script(&mut self) -> Option<PathBuf> {
        self.escalate_for_last_script();
        let next = self.scripts_remaining.pop_front()?;
        self.current_script = Some(next.clone());
        self.proc_status = None;
        self.pid = None;
        Some(next)
    }

    pub fn record_reap(&mut self, pid: u32, status: i32) {
        debug_assert_eq!(self.pid, Some(pid));
        self.proc_status = Some(status);
        self.pid = None;
    }

    /// Marks the current script as failed without ever having had a pid,
    /// for when the supervisor could not spawn it at all. `message` is the
    /// `[laminar] Failed to execute <path>` line a real child would have
    /// printed to its captured stderr, so it lands in the run's log the
    /// same way a reaped script's output does.
    pub fn record_spawn_failure(&mut self, message: &[u8]) {
        self.append_log(message);
        self.proc_status = Some(1);
        self.pid = None;
    }

    /// Abort this run: escalate to the worst possible outcome and drop
    /// every remaining script so the next `step` completes it.
    pub fn abort(&mut self) {
        self.result = self.result.escalate(RunState::Aborted);
        self.scripts_remaining.clear();
        self.current_script = None;
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
