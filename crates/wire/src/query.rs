// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-path queries a (future) transport would send to the daemon.

use serde::{Deserialize, Serialize};

/// What a subscriber wants to receive, per `spec.md` §4.5.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Scope {
    /// Periodic [`crate::DashboardSnapshot`] ticks.
    Dashboard,
    /// Events for a single job name, any build.
    Job { name: String },
    /// The full buffered log for one run, then an incremental tail
    /// ending in its terminal state.
    Log { name: String, build: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Query {
    ListJobs,
    History { name: String, limit: usize },
    GetLog { name: String, build: u32 },
    Subscribe { scope: Scope },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_round_trips_through_json() {
        let q = Query::Subscribe { scope: Scope::Log { name: "hello".into(), build: 3 } };
        let json = serde_json::to_string(&q).unwrap();
        let back: Query = serde_json::from_str(&json).unwrap();
        assert_eq!(q, back);
    }
}
