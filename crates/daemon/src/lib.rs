// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process entry point wiring for the `laminard` binary: CLI parsing,
//! environment resolution, and startup/shutdown/reload orchestration.
//! Kept as a library so integration tests can drive it without shelling
//! out to the compiled binary.

pub mod cli;
pub mod env;
pub mod error;
pub mod lifecycle;
pub mod wiring;

pub use cli::{Cli, Command};
pub use error::DaemonError;
