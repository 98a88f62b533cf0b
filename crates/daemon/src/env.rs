// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.
//!
//! Empty values count as unset. A numeric variable that does not parse is a
//! configuration error.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConfigError;

/// Config file path: SPOOL_CONFIG
pub fn config_path() -> Option<PathBuf> {
    non_empty("SPOOL_CONFIG").map(PathBuf::from)
}

/// Watched directory: SPOOL_DIR
pub fn directory() -> Option<PathBuf> {
    non_empty("SPOOL_DIR").map(PathBuf::from)
}

/// Control file name inside the watched directory: SPOOL_CONTROL_FILE
pub fn control_file() -> Option<String> {
    non_empty("SPOOL_CONTROL_FILE")
}

/// Dispatch cycle period override: SPOOL_POLL_MS
pub fn poll_interval() -> Result<Option<Duration>, ConfigError> {
    Ok(number("SPOOL_POLL_MS")?.map(Duration::from_millis))
}

/// Retention sweep period override: SPOOL_SWEEP_MS
pub fn sweep_interval() -> Result<Option<Duration>, ConfigError> {
    Ok(number("SPOOL_SWEEP_MS")?.map(Duration::from_millis))
}

/// Retention window override: SPOOL_MAX_AGE_SECS
pub fn max_age() -> Result<Option<Duration>, ConfigError> {
    Ok(number("SPOOL_MAX_AGE_SECS")?.map(Duration::from_secs))
}

fn number(name: &'static str) -> Result<Option<u64>, ConfigError> {
    match non_empty(name) {
        Some(value) => value.trim().parse::<u64>().map(Some).map_err(|e| ConfigError::Invalid {
            key: name,
            reason: format!("{value:?} is not a whole number: {e}"),
        }),
        None => Ok(None),
    }
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
