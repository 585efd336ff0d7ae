// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use laminar_core::ParamMap;

fn record(job: &str, build: u32, result: RunState) -> BuildRecord {
    BuildRecord {
        job: JobName::new(job),
        build,
        node: "n1".into(),
        queued_at_ms: 0,
        started_at_ms: 0,
        completed_at_ms: 0,
        result,
        reason: String::new(),
        params: ParamMap::new(),
        log_zstd: Vec::new(),
    }
}

#[test]
fn last_result_is_unknown_with_no_builds() {
    let state = MaterializedState::default();
    assert_eq!(state.last_result("hello"), RunState::Unknown);
}

#[test]
fn last_result_reflects_highest_recorded_build() {
    let mut state = MaterializedState::default();
    state.apply(StorageOp::BuildRecorded { record: record("hello", 1, RunState::Failed) });
    state.apply(StorageOp::BuildRecorded { record: record("hello", 2, RunState::Success) });
    assert_eq!(state.last_result("hello"), RunState::Success);
}

#[test]
fn allocation_without_a_recorded_build_still_bumps_the_counter() {
    let mut state = MaterializedState::default();
    state.apply(StorageOp::BuildNumberAllocated { job: JobName::new("hello"), build: 1 });
    assert_eq!(state.last_build_number("hello"), 1);
    // No record was ever written (crash before persistence) — last_result
    // still reports Unknown, but the number is consumed.
    assert_eq!(state.last_result("hello"), RunState::Unknown);
}

#[test]
fn last_result_skips_an_unrecorded_build_above_a_recorded_one() {
    let mut state = MaterializedState::default();
    state.apply(StorageOp::BuildRecorded { record: record("hello", 1, RunState::Success) });
    state.apply(StorageOp::BuildNumberAllocated { job: JobName::new("hello"), build: 2 });
    assert_eq!(state.last_result("hello"), RunState::Success);
}

#[test]
fn history_orders_newest_first_and_respects_limit() {
    let mut state = MaterializedState::default();
    for b in 1..=5 {
        state.apply(StorageOp::BuildRecorded { record: record("hello", b, RunState::Success) });
    }
    let h = state.history("hello", 2);
    assert_eq!(h.iter().map(|r| r.build).collect::<Vec<_>>(), vec![5, 4]);
}

#[test]
fn history_zero_limit_returns_everything() {
    let mut state = MaterializedState::default();
    for b in 1..=3 {
        state.apply(StorageOp::BuildRecorded { record: record("hello", b, RunState::Success) });
    }
    assert_eq!(state.history("hello", 0).len(), 3);
}

#[test]
fn list_jobs_is_sorted_and_deduplicated_by_counter() {
    let mut state = MaterializedState::default();
    state.apply(StorageOp::BuildNumberAllocated { job: JobName::new("b"), build: 1 });
    state.apply(StorageOp::BuildNumberAllocated { job: JobName::new("a"), build: 1 });
    assert_eq!(state.list_jobs(), vec![JobName::new("a"), JobName::new("b")]);
}
