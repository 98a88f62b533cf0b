// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: ownership of the watched directory, startup.

mod guard;
mod startup;

pub use guard::Guard;
pub use startup::startup;

use std::path::PathBuf;

use spool_adapters::TransportError;
use thiserror::Error;

use crate::config::ConfigError;

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Another instance owns the directory. Expected; exits successfully.
    #[error("control file {0} exists: another instance owns this directory")]
    AlreadyRunning(PathBuf),

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to acquire lock on {path}: {source}")]
    LockFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport setup failed: {0}")]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LifecycleError {
    pub fn is_already_running(&self) -> bool {
        matches!(self, LifecycleError::AlreadyRunning(_))
    }

    /// Process exit code: 0 when another owner is active, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.is_already_running() {
            0
        } else {
            1
        }
    }
}
