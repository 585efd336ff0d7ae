// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate, mirroring
//! the teacher's own `env.rs`: one place that knows the environment
//! variable names so the rest of the crate never calls `std::env::var`
//! directly.

use std::path::PathBuf;
use std::time::Duration;

/// `<home>` directory, resolved `LAMINAR_HOME` > `~/.laminar` (`spec.md`
/// §6 roots its entire filesystem layout at `<home>`).
pub fn home_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("LAMINAR_HOME") {
        return Some(PathBuf::from(dir));
    }
    dirs::home_dir().map(|home| home.join(".laminar"))
}

/// Shutdown drain timeout (default 5s, configurable via
/// `LAMINAR_DRAIN_TIMEOUT_MS`) — the "bounded grace period" `spec.md`
/// §4.7 allows active Runs before a shutdown forces the process to exit.
pub fn drain_timeout() -> Duration {
    std::env::var("LAMINAR_DRAIN_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}

/// How often the shutdown drain loop polls [`laminar_engine::Engine::active_run_count`].
pub fn drain_poll_interval() -> Duration {
    Duration::from_millis(200)
}
