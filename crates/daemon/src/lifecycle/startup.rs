// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and initialization logic.

use spool_adapters::{HttpTransport, HttpTransportConfig};
use spool_core::SystemClock;
use tracing::info;

use super::{Guard, LifecycleError};
use crate::config::Config;
use crate::scheduler::Scheduler;

/// Start the daemon: take the execution guard, then build the transport.
///
/// If anything after the guard fails, the guard is dropped and released,
/// so no control file is left behind. An `AlreadyRunning` error never
/// touches the directory.
pub fn startup(config: Config) -> Result<Scheduler<HttpTransport, SystemClock>, LifecycleError> {
    // 1. Reject unusable settings before touching the directory
    config.validate()?;

    // 2. Acquire the guard - nothing else touches the directory before it
    let guard = Guard::acquire(&config)?;

    // 3. Build the outbound transport
    let transport = HttpTransport::new(HttpTransportConfig {
        timeout: config.request_timeout,
        content_type: config.content_type.clone(),
    })?;

    info!(
        directory = %config.directory.display(),
        poll_ms = config.poll_interval.as_millis() as u64,
        max_age_secs = config.max_age.as_secs(),
        "daemon started"
    );

    Ok(Scheduler::new(config, guard, transport, SystemClock))
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
