// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal and non-terminal states of a single job execution.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a [`Run`](crate::run::RunId).
///
/// Severity among the terminal variants is `Success < Failed < Aborted`;
/// [`RunState::escalate`] folds a newly observed state into the worst one
/// seen so far without ever lowering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Unknown,
    Pending,
    Running,
    Aborted,
    Failed,
    Success,
}

impl RunState {
    /// True once a Run in this state will never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Aborted | RunState::Failed | RunState::Success)
    }

    /// Severity rank used to fold per-script outcomes into a cumulative result.
    /// Only meaningful for the three terminal-capable outcomes; `Unknown`,
    /// `Pending` and `Running` never compete in an escalation.
    fn severity(self) -> u8 {
        match self {
            RunState::Success => 0,
            RunState::Failed => 1,
            RunState::Aborted => 2,
            RunState::Unknown | RunState::Pending | RunState::Running => 0,
        }
    }

    /// Fold `other` into `self`, keeping whichever is more severe.
    /// Never moves a result to a less severe state.
    pub fn escalate(self, other: RunState) -> RunState {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }
}

crate::simple_display! {
    RunState {
        Unknown => "unknown",
        Pending => "pending",
        Running => "running",
        Aborted => "aborted",
        Failed => "failed",
        Success => "success",
    }
}

#[cfg(test)]
#[path = "run_state_tests.rs"]
mod tests;
