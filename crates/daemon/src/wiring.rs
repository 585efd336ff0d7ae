// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the engine's moving parts from a loaded [`ConfigSnapshot`]
//! (`spec.md` §6's filesystem layout) and wires them into a running
//! [`Engine`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use laminar_config::ConfigSnapshot;
use laminar_core::SystemClock;
use laminar_engine::{Engine, NodeTable, Scheduler, Supervisor};
use laminar_storage::FileStore;

use crate::error::DaemonError;

/// `<home>/cfg/scripts`, prepended to every child's `PATH` (`spec.md` §6).
pub fn scripts_dir(home: &Path) -> PathBuf {
    home.join("cfg").join("scripts")
}

/// `<home>/run`, the parent of each run's per-build workspace.
pub fn workspace_root(home: &Path) -> PathBuf {
    home.join("run")
}

/// `<home>/archive/<job>/<build#>`'s parent.
pub fn archive_root(home: &Path) -> PathBuf {
    home.join("archive")
}

/// `<home>/var/store.wal`, the durable build-history log (`spec.md` §4.6).
pub fn store_path(home: &Path) -> PathBuf {
    home.join("var").join("store.wal")
}

/// Creates the directories the engine writes into and opens the durable
/// store. Called once at startup; the store then stays open for the
/// lifetime of the process, including across config reloads.
pub fn open_store(home: &Path) -> Result<Arc<FileStore>, DaemonError> {
    let store_path = store_path(home);
    if let Some(parent) = store_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| DaemonError::CreateDir { path: parent.to_path_buf(), source })?;
    }
    std::fs::create_dir_all(workspace_root(home))
        .map_err(|source| DaemonError::CreateDir { path: workspace_root(home), source })?;
    std::fs::create_dir_all(archive_root(home))
        .map_err(|source| DaemonError::CreateDir { path: archive_root(home), source })?;
    Ok(Arc::new(FileStore::open(&store_path)?))
}

/// Spawns the engine loop from a loaded configuration snapshot and an
/// already-open store.
pub fn spawn_engine(home: &Path, snapshot: ConfigSnapshot, store: Arc<FileStore>) -> Engine {
    let nodes = NodeTable::from_nodes(snapshot.nodes);
    let scheduler = Scheduler::new(snapshot.jobs, nodes, store, SystemClock, workspace_root(home), archive_root(home));
    let (supervisor, events) = Supervisor::new(scripts_dir(home));
    Engine::spawn(scheduler, supervisor, events)
}
