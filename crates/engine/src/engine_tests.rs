use super::*;
use crate::node_table::NodeTable;
use indexmap::IndexMap;
use laminar_core::{JobConfig, Node, SystemClock};
use laminar_storage::FileStore;
use std::collections::BTreeSet;
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;
use tempfile::tempdir;

async fn write_script(path: &std::path::Path, body: &str) {
    tokio::fs::write(path, body).await.unwrap();
    let mut perms = tokio::fs::metadata(path).await.unwrap().permissions();
    perms.set_mode(0o755);
    tokio::fs::set_permissions(path, perms).await.unwrap();
}

fn engine_with(jobs: Vec<JobConfig>, scripts_dir: std::path::PathBuf, workspace: std::path::PathBuf) -> Engine {
    let store = Arc::new(FileStore::open(workspace.join("events.wal")).unwrap());
    let jobs: IndexMap<_, _> = jobs.into_iter().map(|j| (j.name.clone(), j)).collect();
    let nodes = NodeTable::from_nodes([Node::new("n1", 2, BTreeSet::new())]);
    let scheduler = Scheduler::new(jobs, nodes, store, SystemClock, workspace.clone(), workspace.join("archive"));
    let (supervisor, events) = Supervisor::new(scripts_dir);
    Engine::spawn(scheduler, supervisor, events)
}

#[tokio::test]
async fn a_queued_job_runs_to_completion_and_is_waitable() {
    let dir = tempdir().unwrap();
    let main = dir.path().join("main.sh");
    write_script(&main, "#!/bin/sh\necho built\n").await;
    let job = JobConfig { name: JobName::new("hello"), before: vec![], main, after: vec![], tags: BTreeSet::new(), context: vec![] };

    let engine = engine_with(vec![job], dir.path().to_path_buf(), dir.path().to_path_buf());
    let run_id = engine.queue_job("hello", ParamMap::new(), Reason::None).await.unwrap();
    let result = engine.wait(run_id).await;
    assert_eq!(result, Some(RunState::Success));
}

#[tokio::test]
async fn a_failing_script_surfaces_as_a_failed_result() {
    let dir = tempdir().unwrap();
    let main = dir.path().join("main.sh");
    write_script(&main, "#!/bin/sh\nexit 1\n").await;
    let job = JobConfig { name: JobName::new("hello"), before: vec![], main, after: vec![], tags: BTreeSet::new(), context: vec![] };

    let engine = engine_with(vec![job], dir.path().to_path_buf(), dir.path().to_path_buf());
    let run_id = engine.queue_job("hello", ParamMap::new(), Reason::None).await.unwrap();
    let result = engine.wait(run_id).await;
    assert_eq!(result, Some(RunState::Failed));
}

#[tokio::test]
async fn a_missing_script_surfaces_the_laminar_failure_line_in_the_log() {
    let dir = tempdir().unwrap();
    let main = dir.path().join("does-not-exist.sh");
    let job = JobConfig { name: JobName::new("hello"), before: vec![], main: main.clone(), after: vec![], tags: BTreeSet::new(), context: vec![] };

    let engine = engine_with(vec![job], dir.path().to_path_buf(), dir.path().to_path_buf());
    let mut sub = engine.subscribe_log(JobName::new("hello"), 1).await.unwrap();
    let run_id = engine.queue_job("hello", ParamMap::new(), Reason::None).await.unwrap();
    let result = engine.wait(run_id).await;
    assert_eq!(result, Some(RunState::Failed));

    let expected = format!("[laminar] Failed to execute {}", main.display());
    let mut saw_it = false;
    while let Ok(Some(event)) = tokio::time::timeout(std::time::Duration::from_secs(2), sub.recv()).await {
        if let laminar_wire::StatusEvent::Log { chunk, .. } = event {
            if chunk.contains(&expected) {
                saw_it = true;
                break;
            }
        }
    }
    assert!(saw_it);
}

#[tokio::test]
async fn queueing_an_unknown_job_is_rejected() {
    let dir = tempdir().unwrap();
    let engine = engine_with(vec![], dir.path().to_path_buf(), dir.path().to_path_buf());
    let err = engine.queue_job("nope", ParamMap::new(), Reason::None).await.unwrap_err();
    assert!(matches!(err, EngineError::UnknownJob(_)));
}

#[tokio::test]
async fn history_reflects_completed_runs() {
    let dir = tempdir().unwrap();
    let main = dir.path().join("main.sh");
    write_script(&main, "#!/bin/sh\nexit 0\n").await;
    let job = JobConfig { name: JobName::new("hello"), before: vec![], main, after: vec![], tags: BTreeSet::new(), context: vec![] };

    let engine = engine_with(vec![job], dir.path().to_path_buf(), dir.path().to_path_buf());
    let run_id = engine.queue_job("hello", ParamMap::new(), Reason::None).await.unwrap();
    engine.wait(run_id).await;
    let history = engine.history("hello", 0).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].result, RunState::Success);
}

#[tokio::test]
async fn aborting_a_running_job_kills_its_child_and_resolves_as_aborted() {
    let dir = tempdir().unwrap();
    let main = dir.path().join("main.sh");
    write_script(&main, "#!/bin/sh\nsleep 30\n").await;
    let job = JobConfig { name: JobName::new("hello"), before: vec![], main, after: vec![], tags: BTreeSet::new(), context: vec![] };

    let engine = engine_with(vec![job], dir.path().to_path_buf(), dir.path().to_path_buf());
    let run_id = engine.queue_job("hello", ParamMap::new(), Reason::None).await.unwrap();
    // Give the engine's assignment tick a moment to actually spawn the script.
    tokio::time::sleep(std::time::Duration::from_millis(400)).await;
    assert!(engine.abort(run_id.clone()).await);

    let result = tokio::time::timeout(std::time::Duration::from_secs(5), engine.wait(run_id)).await;
    assert_eq!(result.expect("abort should not wait out the full sleep"), Some(RunState::Aborted));
}

#[tokio::test]
async fn log_subscribers_get_the_captured_backlog_then_completion() {
    let dir = tempdir().unwrap();
    let main = dir.path().join("main.sh");
    write_script(&main, "#!/bin/sh\necho hi\n").await;
    let job = JobConfig { name: JobName::new("hello"), before: vec![], main, after: vec![], tags: BTreeSet::new(), context: vec![] };

    let engine = engine_with(vec![job], dir.path().to_path_buf(), dir.path().to_path_buf());
    let run_id = engine.queue_job("hello", ParamMap::new(), Reason::None).await.unwrap();
    // Let the script run and produce output before a follower subscribes.
    tokio::time::sleep(std::time::Duration::from_millis(400)).await;
    let mut sub = engine.subscribe_log(JobName::new("hello"), run_id.build).await.unwrap();
    engine.wait(run_id).await;

    let mut saw_backlog_or_completed = false;
    while let Ok(Some(event)) = tokio::time::timeout(std::time::Duration::from_secs(2), sub.recv()).await {
        match event {
            laminar_wire::StatusEvent::Log { chunk, .. } if chunk.contains("hi") => saw_backlog_or_completed = true,
            laminar_wire::StatusEvent::Completed { .. } => {
                saw_backlog_or_completed = true;
                break;
            }
            _ => {}
        }
    }
    assert!(saw_backlog_or_completed);
}

#[tokio::test]
async fn job_subscribers_see_the_full_lifecycle() {
    let dir = tempdir().unwrap();
    let main = dir.path().join("main.sh");
    write_script(&main, "#!/bin/sh\necho hi\n").await;
    let job = JobConfig { name: JobName::new("hello"), before: vec![], main, after: vec![], tags: BTreeSet::new(), context: vec![] };

    let engine = engine_with(vec![job], dir.path().to_path_buf(), dir.path().to_path_buf());
    let mut sub = engine.subscribe_job(JobName::new("hello")).await.unwrap();
    let run_id = engine.queue_job("hello", ParamMap::new(), Reason::None).await.unwrap();
    engine.wait(run_id).await;

    let mut saw_completed = false;
    while let Ok(Some(event)) = tokio::time::timeout(std::time::Duration::from_secs(2), sub.recv()).await {
        if matches!(event, laminar_wire::StatusEvent::Completed { .. }) {
            saw_completed = true;
            break;
        }
    }
    assert!(saw_completed);
}
