// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spoold: directory-based job dispatcher.
//!
//! Exits 0 after a signal-driven shutdown or when another instance already
//! owns the directory, 1 on any fatal error.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use spool_daemon::{env, logging, startup, Config, ConfigError, Overrides};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "spoold", version, about = "Dispatch job files from a watched directory")]
struct Cli {
    /// TOML config file [env: SPOOL_CONFIG]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Watched directory [env: SPOOL_DIR]
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Control file name inside the watched directory [env: SPOOL_CONTROL_FILE]
    #[arg(long)]
    control_file: Option<String>,
}

impl Cli {
    fn overrides(&self) -> Result<Overrides, ConfigError> {
        let mut overrides = Overrides::from_env()?;
        if let Some(dir) = &self.dir {
            overrides.directory = Some(dir.clone());
        }
        if let Some(name) = &self.control_file {
            overrides.control_file = Some(name.clone());
        }
        Ok(overrides)
    }

    fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(env::config_path)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = cli
        .overrides()
        .and_then(|overrides| Config::load(cli.config_path().as_deref(), overrides));
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            // Logging is configured by the config, so this goes straight to stderr
            eprintln!("spoold: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = logging::init(config.log_file.as_deref());

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to build runtime");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(config))
}

async fn run(config: Config) -> ExitCode {
    // Handlers go in before the control file exists, so a signal at any
    // later point takes the graceful path and releases the guard.
    let signals = match ShutdownSignals::register() {
        Ok(signals) => signals,
        Err(e) => {
            error!(error = %e, "failed to register signal handlers");
            return ExitCode::FAILURE;
        }
    };
    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals.recv().await;
        trigger.cancel();
    });

    let scheduler = match startup(config) {
        Ok(scheduler) => scheduler,
        Err(e) if e.is_already_running() => {
            info!("{e}");
            return ExitCode::from(e.exit_code());
        }
        Err(e) => {
            error!(error = %e, "startup failed");
            return ExitCode::from(e.exit_code());
        }
    };

    scheduler.run(shutdown).await;
    info!("daemon stopped");
    ExitCode::SUCCESS
}

#[cfg(unix)]
struct ShutdownSignals {
    terminate: tokio::signal::unix::Signal,
    interrupt: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            interrupt: signal(SignalKind::interrupt())?,
        })
    }

    async fn recv(mut self) {
        tokio::select! {
            _ = self.terminate.recv() => info!("received SIGTERM"),
            _ = self.interrupt.recv() => info!("received SIGINT"),
        }
    }
}

#[cfg(not(unix))]
struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    fn register() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn recv(self) {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received ctrl-c");
        }
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
