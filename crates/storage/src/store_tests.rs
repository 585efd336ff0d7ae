// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use laminar_core::ParamMap;
use tempfile::tempdir;

fn record(job: &str, build: u32, result: RunState) -> BuildRecord {
    BuildRecord {
        job: JobName::new(job),
        build,
        node: "n1".into(),
        queued_at_ms: 0,
        started_at_ms: 0,
        completed_at_ms: 1,
        result,
        reason: "ok".into(),
        params: ParamMap::new(),
        log_zstd: zstd::stream::encode_all(&b"hi\n"[..], 0).unwrap(),
    }
}

#[test]
fn build_numbers_start_at_one_and_increase() {
    let dir = tempdir().unwrap();
    let store = FileStore::open(dir.path().join("events.wal")).unwrap();
    assert_eq!(store.next_build_number("hello").unwrap(), 1);
    assert_eq!(store.next_build_number("hello").unwrap(), 2);
    assert_eq!(store.next_build_number("hello").unwrap(), 3);
}

#[test]
fn build_numbers_are_independent_per_job() {
    let dir = tempdir().unwrap();
    let store = FileStore::open(dir.path().join("events.wal")).unwrap();
    assert_eq!(store.next_build_number("a").unwrap(), 1);
    assert_eq!(store.next_build_number("b").unwrap(), 1);
    assert_eq!(store.next_build_number("a").unwrap(), 2);
}

#[test]
fn record_build_is_idempotent_on_job_and_build() {
    let dir = tempdir().unwrap();
    let store = FileStore::open(dir.path().join("events.wal")).unwrap();
    store.next_build_number("hello").unwrap();
    store.record_build(record("hello", 1, RunState::Success)).unwrap();
    store.record_build(record("hello", 1, RunState::Failed)).unwrap();
    // First write wins; immutable once recorded.
    assert_eq!(store.last_result("hello"), RunState::Success);
}

#[test]
fn last_result_reflects_the_record_just_written_at_the_max_build() {
    let dir = tempdir().unwrap();
    let store = FileStore::open(dir.path().join("events.wal")).unwrap();
    let n = store.next_build_number("hello").unwrap();
    store.record_build(record("hello", n, RunState::Failed)).unwrap();
    assert_eq!(store.last_result("hello"), RunState::Failed);
}

#[test]
fn allocated_build_number_is_consumed_even_without_a_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.wal");
    {
        let store = FileStore::open(&path).unwrap();
        // Simulates a crash between allocation and record_build.
        store.next_build_number("hello").unwrap();
    }
    let store = FileStore::open(&path).unwrap();
    assert_eq!(store.next_build_number("hello").unwrap(), 2);
}

#[test]
fn restart_resumes_build_numbers_without_gaps_or_reemission() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.wal");
    {
        let store = FileStore::open(&path).unwrap();
        for _ in 0..7 {
            let n = store.next_build_number("x").unwrap();
            store.record_build(record("x", n, RunState::Success)).unwrap();
        }
    }
    // restart
    let store = FileStore::open(&path).unwrap();
    assert_eq!(store.next_build_number("x").unwrap(), 8);
    assert_eq!(store.history("x", 0).len(), 7);
}

#[test]
fn build_result_returns_the_recorded_result_of_one_specific_build() {
    let dir = tempdir().unwrap();
    let store = FileStore::open(dir.path().join("events.wal")).unwrap();
    store.next_build_number("hello").unwrap();
    store.record_build(record("hello", 1, RunState::Failed)).unwrap();
    assert_eq!(store.build_result("hello", 1), Some(RunState::Failed));
}

#[test]
fn build_result_of_an_unrecorded_build_is_none() {
    let dir = tempdir().unwrap();
    let store = FileStore::open(dir.path().join("events.wal")).unwrap();
    assert_eq!(store.build_result("hello", 1), None);
}

#[test]
fn get_log_decompresses_stored_bytes() {
    let dir = tempdir().unwrap();
    let store = FileStore::open(dir.path().join("events.wal")).unwrap();
    store.next_build_number("hello").unwrap();
    store.record_build(record("hello", 1, RunState::Success)).unwrap();
    let log = store.get_log("hello", 1).unwrap();
    assert_eq!(log, Some(b"hi\n".to_vec()));
}

#[test]
fn get_log_of_unknown_build_is_none() {
    let dir = tempdir().unwrap();
    let store = FileStore::open(dir.path().join("events.wal")).unwrap();
    assert_eq!(store.get_log("hello", 1).unwrap(), None);
}

#[test]
fn list_jobs_reports_every_job_with_an_allocated_build() {
    let dir = tempdir().unwrap();
    let store = FileStore::open(dir.path().join("events.wal")).unwrap();
    store.next_build_number("b").unwrap();
    store.next_build_number("a").unwrap();
    assert_eq!(store.list_jobs(), vec![JobName::new("a"), JobName::new("b")]);
}
