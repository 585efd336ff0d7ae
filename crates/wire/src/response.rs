// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Responses to [`crate::Query`] reads.

use crate::status::RunSummary;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Jobs { names: Vec<String> },
    History { runs: Vec<RunSummary> },
    Log { bytes: Vec<u8> },
    Subscribed,
    Error { message: String },
}
