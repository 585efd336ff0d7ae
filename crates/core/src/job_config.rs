// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static, per-job configuration as loaded from `<home>/cfg/jobs/`.

use smol_str::SmolStr;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Immutable job name. Configured, not generated — unlike the IDs handed
/// out by [`crate::define_id!`], a job name comes from the filesystem
/// (`<home>/cfg/jobs/<name>.run`) and is stable across restarts.
pub type JobName = SmolStr;

/// One job's configuration: the ordered scripts it runs, the tags
/// restricting which nodes may run it, and its environment context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    pub name: JobName,
    /// Run before `main`, in order.
    pub before: Vec<PathBuf>,
    /// The job's single required script.
    pub main: PathBuf,
    /// Run after `main`, in order, regardless of `main`'s outcome.
    pub after: Vec<PathBuf>,
    /// Nodes may run this job iff this set is empty or intersects the
    /// node's own tag set.
    pub tags: BTreeSet<String>,
    /// Env files layered into the child environment, in order.
    pub context: Vec<PathBuf>,
}

impl JobConfig {
    /// The ordered script queue for a fresh run: before, then main, then after.
    pub fn script_sequence(&self) -> Vec<PathBuf> {
        let mut scripts = Vec::with_capacity(self.before.len() + 1 + self.after.len());
        scripts.extend(self.before.iter().cloned());
        scripts.push(self.main.clone());
        scripts.extend(self.after.iter().cloned());
        scripts
    }
}

#[cfg(test)]
#[path = "job_config_tests.rs"]
mod tests;
