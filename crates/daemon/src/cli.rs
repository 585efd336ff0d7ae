// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `laminard` command-line surface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "laminard", version, about = "Lightweight CI job engine daemon")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the engine loop and run until a shutdown signal arrives.
    Run {
        /// `<home>` directory (`spec.md` §6). Defaults to `LAMINAR_HOME`
        /// or `~/.laminar`.
        #[arg(long)]
        home: Option<PathBuf>,
    },
    /// Load `<home>/cfg` and report whether it is well-formed, without
    /// starting the engine. Exits non-zero on `FatalConfigError`
    /// (`spec.md` §7).
    CheckConfig {
        #[arg(long)]
        home: Option<PathBuf>,
    },
}
