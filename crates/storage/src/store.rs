// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The narrow persistent-store interface consumed by the scheduler
//! (`spec.md` §4.6), plus one durable implementation.

use laminar_core::{JobName, RunState};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::state::MaterializedState;
use crate::types::BuildRecord;
use crate::wal::{StorageOp, Wal};

/// Narrow persistence interface the scheduler consumes. Implementors must
/// make `next_build_number` + `record_build` safe to call from the
/// single-threaded engine loop (§5: "if it performs blocking I/O it is the
/// store's responsibility to keep operations short").
pub trait Store: Send + Sync {
    /// Returns `1 + max build number ever recorded for `name`` (`1` if
    /// none). Must be called at most once per `(name, build#)` pair — the
    /// caller is responsible for that invariant, this call is not itself
    /// idempotent.
    fn next_build_number(&self, job: &str) -> Result<u32, StoreError>;

    /// Idempotent on `(job, build)`: once written, a record is immutable.
    fn record_build(&self, record: BuildRecord) -> Result<(), StoreError>;

    fn last_result(&self, job: &str) -> RunState;

    /// The persisted result of one specific build, if its record was
    /// written. Backs waiter registration for a run that has already left
    /// the active registry (`spec.md` §4.5: "registering after completion
    /// must resolve immediately with the stored final state").
    fn build_result(&self, job: &str, build: u32) -> Option<RunState>;

    fn history(&self, job: &str, limit: usize) -> Vec<BuildRecord>;

    fn get_log(&self, job: &str, build: u32) -> Result<Option<Vec<u8>>, StoreError>;

    fn list_jobs(&self) -> Vec<JobName>;
}

/// WAL-backed [`Store`]. All state lives in memory after replay; the WAL
/// is the durability mechanism, not a query path.
pub struct FileStore {
    wal: Mutex<Wal>,
    state: Mutex<MaterializedState>,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let ops = Wal::replay(&path)?;
        let state = MaterializedState::replay(ops);
        let wal = Wal::open(&path)?;
        Ok(Self { wal: Mutex::new(wal), state: Mutex::new(state) })
    }
}

impl Store for FileStore {
    fn next_build_number(&self, job: &str) -> Result<u32, StoreError> {
        let mut state = self.state.lock();
        let next = state.last_build_number(job) + 1;
        let op = StorageOp::BuildNumberAllocated { job: JobName::new(job), build: next };
        let mut wal = self.wal.lock();
        wal.append(&op)?;
        wal.flush()?;
        state.apply(op);
        Ok(next)
    }

    fn record_build(&self, record: BuildRecord) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        if state.builds.contains_key(&(record.job.clone(), record.build)) {
            return Ok(());
        }
        let op = StorageOp::BuildRecorded { record };
        let mut wal = self.wal.lock();
        wal.append(&op)?;
        wal.flush()?;
        state.apply(op);
        Ok(())
    }

    fn last_result(&self, job: &str) -> RunState {
        self.state.lock().last_result(job)
    }

    fn build_result(&self, job: &str, build: u32) -> Option<RunState> {
        self.state.lock().builds.get(&(job.into(), build)).map(|r| r.result)
    }

    fn history(&self, job: &str, limit: usize) -> Vec<BuildRecord> {
        self.state.lock().history(job, limit).into_iter().cloned().collect()
    }

    fn get_log(&self, job: &str, build: u32) -> Result<Option<Vec<u8>>, StoreError> {
        let state = self.state.lock();
        state.builds.get(&(job.into(), build)).map(|r| r.log_bytes()).transpose()
    }

    fn list_jobs(&self) -> Vec<JobName> {
        self.state.lock().list_jobs()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
