// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use laminar_daemon::{cli::Command, env, lifecycle, Cli, DaemonError};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let home_hint = match &cli.command {
        Command::Run { home } | Command::CheckConfig { home } => home.clone().or_else(env::home_dir),
    };
    let _log_guard = init_tracing(home_hint.as_deref());

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!(error = %err, "failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Run { home } => runtime.block_on(run(home)),
        Command::CheckConfig { home } => check_config(home),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "laminard exited with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(home: Option<PathBuf>) -> Result<(), DaemonError> {
    let home = resolve_home(home)?;
    lifecycle::run(&home).await
}

fn check_config(home: Option<PathBuf>) -> Result<(), DaemonError> {
    let home = resolve_home(home)?;
    let snapshot = laminar_config::load(&home)?;
    println!("{} job(s), {} node(s) under {}", snapshot.jobs.len(), snapshot.nodes.len(), home.display());
    Ok(())
}

fn resolve_home(home: Option<PathBuf>) -> Result<PathBuf, DaemonError> {
    home.or_else(env::home_dir).ok_or(DaemonError::NoHomeDir)
}

/// Sets up structured logging: to `<home>/var/laminard.log` when a
/// `<home>` directory is known, otherwise to stderr. Returns the
/// non-blocking writer's guard, which must stay alive for the process's
/// lifetime or buffered log lines are dropped on exit.
fn init_tracing(home: Option<&std::path::Path>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(home) = home else {
        tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
        return None;
    };

    let log_dir = home.join("var");
    if std::fs::create_dir_all(&log_dir).is_err() {
        tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, "laminard.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();
    Some(guard)
}
