// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process supervision (`spec.md` §4.3): composing a script's environment
//! and spawning it, then forwarding its combined output and exit status
//! back to the engine loop.
//!
//! The original forks, resets the child's blocked-`SIGCHLD` mask, then
//! execs (`original_source/src/run.cpp::step`). `tokio::process` reaps
//! children through its own internal `SIGCHLD` handler rather than a
//! process-wide blocked mask, so there is nothing here to unblock before
//! exec and no `pre_exec` hook is installed — which also keeps this crate
//! free of the `unsafe` blocks a hook would need under the workspace's
//! `unsafe_code = "forbid"` lint.

use indexmap::IndexMap;
use laminar_core::{parse_kv, EngineError, ParamMap};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

/// Events the supervisor reports back to the engine loop, tagged by pid so
/// the caller can map them back to a [`crate::run::RunId`] via the
/// registry's pid index.
#[derive(Debug)]
pub enum SupervisorEvent {
    LogChunk { pid: u32, bytes: Vec<u8> },
    Reaped { pid: u32, status: i32 },
}

const LOG_CHUNK_SIZE: usize = 8192;

pub struct Supervisor {
    /// `<home>/cfg/scripts`, prepended to the child's `PATH`.
    scripts_dir: PathBuf,
    events: mpsc::UnboundedSender<SupervisorEvent>,
    /// One-shot kill requests for currently-executing children, keyed by
    /// pid. Emptied by the per-child reap task as soon as it either
    /// delivers a kill or observes the child exit on its own — never held
    /// across an `.await`, unlike `registry`'s similar pid map.
    kill_requests: Arc<Mutex<HashMap<u32, oneshot::Sender<()>>>>,
}

impl Supervisor {
    pub fn new(scripts_dir: PathBuf) -> (Self, mpsc::UnboundedReceiver<SupervisorEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { scripts_dir, events: tx, kill_requests: Arc::new(Mutex::new(HashMap::new())) }, rx)
    }

    /// Sends a termination request to the script currently running as
    /// `pid` (`spec.md` §4.1's abort path). Returns `false` if no such
    /// child is tracked, e.g. it has already exited.
    pub fn kill(&self, pid: u32) -> bool {
        match self.kill_requests.lock().remove(&pid) {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Composes the child environment per `spec.md` §4.3's layering order
    /// (inherited baseline, `PATH` prefix, env files in order, well-known
    /// `l*` vars, then params only where still unset) and spawns `script`.
    /// Returns the child's pid; output and exit status arrive later as
    /// [`SupervisorEvent`]s.
    pub async fn spawn(
        &self,
        script: &Path,
        work_dir: &Path,
        env_files: &[PathBuf],
        well_known: &IndexMap<String, String>,
        params: &ParamMap,
    ) -> Result<u32, EngineError> {
        tokio::fs::create_dir_all(work_dir).await.map_err(|source| EngineError::ForkFailed {
            script: work_dir.display().to_string(),
            source,
        })?;

        let mut env: IndexMap<String, String> = std::env::vars().collect();

        let prior_path = env.get("PATH").cloned().unwrap_or_default();
        env.insert("PATH".to_string(), format!("{}:{}", self.scripts_dir.display(), prior_path));

        for file in env_files {
            let contents = tokio::fs::read_to_string(file).await.map_err(|source| {
                EngineError::ForkFailed { script: file.display().to_string(), source }
            })?;
            env.extend(parse_kv(&contents));
        }

        env.extend(well_known.iter().map(|(k, v)| (k.clone(), v.clone())));

        for (key, value) in params.iter() {
            env.entry(key.clone()).or_insert_with(|| value.clone());
        }

        let mut child = Command::new(script)
            .current_dir(work_dir)
            .env_clear()
            .envs(env)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| spawn_error(script, source))?;

        let pid = child.id().unwrap_or_default();

        if let Some(stdout) = child.stdout.take() {
            self.spawn_reader(pid, stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            self.spawn_reader(pid, stderr);
        }

        let (kill_tx, mut kill_rx) = oneshot::channel();
        self.kill_requests.lock().insert(pid, kill_tx);

        let events = self.events.clone();
        let kill_requests = self.kill_requests.clone();
        tokio::spawn(async move {
            let status = tokio::select! {
                status = child.wait() => status,
                _ = &mut kill_rx => {
                    let _ = child.start_kill();
                    child.wait().await
                }
            };
            kill_requests.lock().remove(&pid);
            let code = match status {
                Ok(status) => exit_code(status),
                Err(_) => -1,
            };
            let _ = events.send(SupervisorEvent::Reaped { pid, status: code });
        });

        Ok(pid)
    }

    fn spawn_reader(&self, pid: u32, mut pipe: impl tokio::io::AsyncRead + Unpin + Send + 'static) {
        let events = self.events.clone();
        tokio::spawn(async move {
            let mut buf = vec![0u8; LOG_CHUNK_SIZE];
            loop {
                match pipe.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        if events
                            .send(SupervisorEvent::LogChunk { pid, bytes: buf[..n].to_vec() })
                            .is_err()
                        {
                            break;
                        }
                    }
                }
            }
        });
    }
}

fn spawn_error(script: &Path, source: std::io::Error) -> EngineError {
    let script = script.display().to_string();
    match source.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
            EngineError::ExecFailed { script, source }
        }
        _ => EngineError::ForkFailed { script, source },
    }
}

#[cfg(unix)]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.code().or_else(|| status.signal().map(|sig| 128 + sig)).unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
