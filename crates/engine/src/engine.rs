// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The engine loop (`spec.md` §4.7): a single task that owns the
//! [`Scheduler`] and [`Supervisor`] and drives them from four sources —
//! reap/log notifications from the supervisor, commands from callers, and
//! a periodic assignment/dashboard tick. Nothing outside this task ever
//! touches [`Run`] state directly, so no lock is ever held across an
//! `.await`.

use crate::run::{Reason, RunId};
use crate::scheduler::{Assignment, Scheduler, SchedulerAction};
use crate::supervisor::{Supervisor, SupervisorEvent};
use indexmap::IndexMap;
use laminar_core::{Clock, EngineError, JobConfig, JobName, Node, ParamMap, RunState};
use laminar_storage::{BuildRecord, StoreError};
use laminar_wire::{DashboardSnapshot, StatusEvent};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

/// How often the engine looks for newly assignable runs and republishes
/// the dashboard snapshot.
const ASSIGN_TICK: Duration = Duration::from_millis(250);

pub enum Command {
    QueueJob {
        job: String,
        params: ParamMap,
        reason: Reason,
        respond: oneshot::Sender<Result<RunId, EngineError>>,
    },
    Abort {
        run_id: RunId,
        respond: oneshot::Sender<bool>,
    },
    Wait {
        run_id: RunId,
        respond: oneshot::Sender<oneshot::Receiver<RunState>>,
    },
    SubscribeJob {
        job: JobName,
        respond: oneshot::Sender<mpsc::Receiver<StatusEvent>>,
    },
    SubscribeLog {
        job: JobName,
        build: u32,
        respond: oneshot::Sender<mpsc::Receiver<StatusEvent>>,
    },
    SubscribeDashboard {
        respond: oneshot::Sender<mpsc::Receiver<DashboardSnapshot>>,
    },
    ListJobs {
        respond: oneshot::Sender<Vec<JobName>>,
    },
    History {
        job: String,
        limit: usize,
        respond: oneshot::Sender<Vec<BuildRecord>>,
    },
    GetLog {
        job: String,
        build: u32,
        respond: oneshot::Sender<Result<Option<Vec<u8>>, StoreError>>,
    },
    Reload {
        jobs: IndexMap<JobName, JobConfig>,
        nodes: Vec<Node>,
        respond: oneshot::Sender<()>,
    },
    ActiveRuns {
        respond: oneshot::Sender<usize>,
    },
}

/// A handle to a running engine task. Cloning shares the command channel;
/// dropping every handle stops the engine once its channel drains.
#[derive(Clone)]
pub struct Engine {
    commands: mpsc::UnboundedSender<Command>,
}

impl Engine {
    /// Spawns the engine loop as a background task and returns a handle
    /// to it. The task runs until every [`Engine`] handle is dropped.
    pub fn spawn<C>(scheduler: Scheduler<C>, supervisor: Supervisor, events: mpsc::UnboundedReceiver<SupervisorEvent>) -> Self
    where
        C: Clock + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_loop(scheduler, supervisor, events, rx));
        Self { commands: tx }
    }

    pub async fn queue_job(&self, job: impl Into<String>, params: ParamMap, reason: Reason) -> Result<RunId, EngineError> {
        let (respond, rx) = oneshot::channel();
        self.send(Command::QueueJob { job: job.into(), params, reason, respond });
        rx.await.unwrap_or_else(|_| Err(EngineError::ClientOverflow))
    }

    pub async fn abort(&self, run_id: RunId) -> bool {
        let (respond, rx) = oneshot::channel();
        self.send(Command::Abort { run_id, respond });
        rx.await.unwrap_or(false)
    }

    pub async fn wait(&self, run_id: RunId) -> Option<RunState> {
        let (respond, rx) = oneshot::channel();
        self.send(Command::Wait { run_id, respond });
        rx.await.ok()?.await.ok()
    }

    pub async fn subscribe_job(&self, job: JobName) -> Option<mpsc::Receiver<StatusEvent>> {
        let (respond, rx) = oneshot::channel();
        self.send(Command::SubscribeJob { job, respond });
        rx.await.ok()
    }

    pub async fn subscribe_log(&self, job: JobName, build: u32) -> Option<mpsc::Receiver<StatusEvent>> {
        let (respond, rx) = oneshot::channel();
        self.send(Command::SubscribeLog { job, build, respond });
        rx.await.ok()
    }

    pub async fn subscribe_dashboard(&self) -> Option<mpsc::Receiver<DashboardSnapshot>> {
        let (respond, rx) = oneshot::channel();
        self.send(Command::SubscribeDashboard { respond });
        rx.await.ok()
    }

    pub async fn list_jobs(&self) -> Vec<JobName> {
        let (respond, rx) = oneshot::channel();
        self.send(Command::ListJobs { respond });
        rx.await.unwrap_or_default()
    }

    pub async fn history(&self, job: impl Into<String>, limit: usize) -> Vec<BuildRecord> {
        let (respond, rx) = oneshot::channel();
        self.send(Command::History { job: job.into(), limit, respond });
        rx.await.unwrap_or_default()
    }

    pub async fn get_log(&self, job: impl Into<String>, build: u32) -> Result<Option<Vec<u8>>, StoreError> {
        let (respond, rx) = oneshot::channel();
        self.send(Command::GetLog { job: job.into(), build, respond });
        rx.await.unwrap_or(Ok(None))
    }

    /// Applies a freshly loaded configuration (`spec.md` §6's
    /// `SIGHUP`-triggered reload) without restarting the engine or
    /// disturbing runs already in flight.
    pub async fn reload(&self, jobs: IndexMap<JobName, JobConfig>, nodes: Vec<Node>) {
        let (respond, rx) = oneshot::channel();
        self.send(Command::Reload { jobs, nodes, respond });
        let _ = rx.await;
    }

    /// Number of runs still queued or running, polled by the daemon's
    /// shutdown grace period (`spec.md` §4.7).
    pub async fn active_run_count(&self) -> usize {
        let (respond, rx) = oneshot::channel();
        self.send(Command::ActiveRuns { respond });
        rx.await.unwrap_or(0)
    }

    fn send(&self, command: Command) {
        // The receiving end only goes away when the engine task has
        // exited; a dropped response channel surfaces as a None/default
        // at the caller, so there is nothing to do with this error here.
        let _ = self.commands.send(command);
    }
}

async fn run_loop<C>(
    mut scheduler: Scheduler<C>,
    supervisor: Supervisor,
    mut events: mpsc::UnboundedReceiver<SupervisorEvent>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) where
    C: Clock + 'static,
{
    let mut ticker = tokio::time::interval(ASSIGN_TICK);

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(SupervisorEvent::LogChunk { pid, bytes }) => {
                        if let Some(run_id) = scheduler.run_id_for_pid(pid) {
                            scheduler.record_log(&run_id, &bytes);
                        }
                    }
                    Some(SupervisorEvent::Reaped { pid, status }) => {
                        if let Some(action) = scheduler.on_reap(pid, status) {
                            drive(&mut scheduler, &supervisor, action).await;
                        }
                    }
                    None => break,
                }
            }
            command = commands.recv() => {
                match command {
                    Some(command) => handle_command(&mut scheduler, &supervisor, command),
                    None => break,
                }
            }
            _ = ticker.tick() => {
                for assignment in scheduler.assign_new_jobs() {
                    spawn_assignment(&mut scheduler, &supervisor, assignment).await;
                }
                scheduler.publish_dashboard_snapshot();
            }
        }
    }
    info!("engine loop exiting");
}

fn handle_command<C: Clock + 'static>(scheduler: &mut Scheduler<C>, supervisor: &Supervisor, command: Command) {
    match command {
        Command::QueueJob { job, params, reason, respond } => {
            let result = scheduler.queue_job(&job, params, reason);
            let _ = respond.send(result);
        }
        Command::Abort { run_id, respond } => {
            let outcome = scheduler.abort(&run_id);
            if let Some(Some(pid)) = outcome {
                supervisor.kill(pid);
            }
            let _ = respond.send(outcome.is_some());
        }
        Command::Wait { run_id, respond } => {
            let rx = scheduler.register_waiter(run_id);
            let _ = respond.send(rx);
        }
        Command::SubscribeJob { job, respond } => {
            let _ = respond.send(scheduler.subscribe_job(job));
        }
        Command::SubscribeLog { job, build, respond } => {
            let _ = respond.send(scheduler.subscribe_log(job, build));
        }
        Command::SubscribeDashboard { respond } => {
            let _ = respond.send(scheduler.subscribe_dashboard());
        }
        Command::ListJobs { respond } => {
            let _ = respond.send(scheduler.list_jobs());
        }
        Command::History { job, limit, respond } => {
            let _ = respond.send(scheduler.history(&job, limit));
        }
        Command::GetLog { job, build, respond } => {
            let _ = respond.send(scheduler.get_log(&job, build));
        }
        Command::Reload { jobs, nodes, respond } => {
            scheduler.reload_config(jobs, nodes);
            let _ = respond.send(());
        }
        Command::ActiveRuns { respond } => {
            let _ = respond.send(scheduler.active_run_count());
        }
    }
}

async fn spawn_assignment<C: Clock + 'static>(scheduler: &mut Scheduler<C>, supervisor: &Supervisor, assignment: Assignment) {
    let Assignment { run_id, script, work_dir, env_files, well_known, params } = assignment;
    match supervisor.spawn(&script, &work_dir, &env_files, &well_known, &params).await {
        Ok(pid) => scheduler.record_spawned(&run_id, pid),
        Err(error) => {
            warn!(%run_id, %error, "failed to start script");
            if let Some(action) = scheduler.fail_current_script(run_id, &script) {
                Box::pin(drive(scheduler, supervisor, action)).await;
            }
        }
    }
}

async fn drive<C: Clock + 'static>(scheduler: &mut Scheduler<C>, supervisor: &Supervisor, action: SchedulerAction) {
    if let SchedulerAction::Spawn(assignment) = action {
        spawn_assignment(scheduler, supervisor, assignment).await;
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
