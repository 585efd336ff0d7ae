// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! laminar-storage: the durable build-history store behind `spec.md` §4.6 —
//! an append-only write-ahead log replayed into an in-memory materialized
//! state at startup.

mod error;
mod state;
mod store;
mod types;
mod wal;

pub use error::StoreError;
pub use state::MaterializedState;
pub use store::{FileStore, Store};
pub use types::BuildRecord;
pub use wal::{StorageOp, Wal};
