// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable record of one completed build.

use laminar_core::{JobName, NodeName, ParamMap, RunState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildRecord {
    pub job: JobName,
    pub build: u32,
    pub node: NodeName,
    pub queued_at_ms: u64,
    pub started_at_ms: u64,
    pub completed_at_ms: u64,
    pub result: RunState,
    pub reason: String,
    pub params: ParamMap,
    /// zstd-compressed captured output.
    pub log_zstd: Vec<u8>,
}

impl BuildRecord {
    pub fn log_bytes(&self) -> Result<Vec<u8>, crate::error::StoreError> {
        Ok(zstd::stream::decode_all(self.log_zstd.as_slice())?)
    }
}
