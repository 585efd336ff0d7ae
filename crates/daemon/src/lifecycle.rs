// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup, `SIGHUP` reload, and graceful-shutdown orchestration
//! (`spec.md` §4.7, §6).

use std::path::Path;

use laminar_engine::Engine;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

use crate::env;
use crate::error::DaemonError;
use crate::wiring;

/// Loads `<home>/cfg`, wires up the engine, and runs until `SIGTERM` or
/// `SIGINT` requests a shutdown. `SIGHUP` triggers a config reload
/// in-place without interrupting runs already in flight.
pub async fn run(home: &Path) -> Result<(), DaemonError> {
    let snapshot = laminar_config::load(home)?;
    let store = wiring::open_store(home)?;
    let engine = wiring::spawn_engine(home, snapshot, store);

    let mut sighup = signal(SignalKind::hangup()).map_err(DaemonError::Signal)?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(DaemonError::Signal)?;
    let mut sigint = signal(SignalKind::interrupt()).map_err(DaemonError::Signal)?;

    info!(home = %home.display(), "laminard started");

    loop {
        tokio::select! {
            _ = sighup.recv() => {
                reload(home, &engine);
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                break;
            }
        }
    }

    drain(&engine).await;
    Ok(())
}

fn reload(home: &Path, engine: &Engine) {
    match laminar_config::load(home) {
        Ok(snapshot) => {
            let engine = engine.clone();
            tokio::spawn(async move {
                engine.reload(snapshot.jobs, snapshot.nodes).await;
                info!("config reloaded");
            });
        }
        Err(err) => {
            warn!(error = %err, "SIGHUP reload failed, keeping previous configuration");
        }
    }
}

/// Waits for active runs to finish, up to [`env::drain_timeout`], before
/// returning so the process can exit. Runs still active past the grace
/// period are left to the supervisor's own process-group teardown; this
/// function never kills anything itself.
async fn drain(engine: &Engine) {
    let deadline = tokio::time::Instant::now() + env::drain_timeout();
    loop {
        let active = engine.active_run_count().await;
        if active == 0 {
            info!("all runs drained, exiting");
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            warn!(active, "drain timeout elapsed with runs still active, exiting anyway");
            return;
        }
        tokio::time::sleep(env::drain_poll_interval()).await;
    }
}
