// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport-neutral wire contracts for the (out-of-scope) HTTP/WebSocket
//! and RPC transports.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload. This
//! crate defines the payloads and the framing helpers; it never opens a
//! socket itself.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod frame;
mod query;
mod response;
mod status;

pub use frame::{decode, encode, ProtocolError};
pub use query::{Query, Scope};
pub use response::Response;
pub use status::{DashboardSnapshot, NodeSummary, RunSummary, StatusEvent};
