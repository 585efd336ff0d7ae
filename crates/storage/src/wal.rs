// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only, newline-delimited JSON log of [`StorageOp`]s.
//!
//! Mirrors the teacher's WAL-plus-replay pattern, narrowed to the two
//! operations the persistent store interface in `spec.md` §4.6 needs:
//! allocating a build number and recording a finished build. Allocation
//! is written as its own record *before* the build runs, so a crash
//! between allocation and `record_build` still leaves the number
//! consumed (see `StorePersistenceError` in `spec.md` §7).

use laminar_core::JobName;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::error::StoreError;
use crate::types::BuildRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StorageOp {
    BuildNumberAllocated { job: JobName, build: u32 },
    BuildRecorded { record: BuildRecord },
}

pub struct Wal {
    file: File,
}

impl Wal {
    /// Open (creating if absent) the WAL file for appending.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    pub fn append(&mut self, op: &StorageOp) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(op)?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.file.flush()?;
        Ok(())
    }

    /// Replay every record in `path` in append order. Does not open the
    /// file for writing — callers that also want to append should
    /// replay first, then call [`Wal::open`].
    pub fn replay(path: &Path) -> Result<Vec<StorageOp>, StoreError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(path)?);
        let mut ops = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let op = serde_json::from_str(&line)
                .map_err(|source| StoreError::Corrupt { line: lineno + 1, source })?;
            ops.push(op);
        }
        Ok(ops)
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
