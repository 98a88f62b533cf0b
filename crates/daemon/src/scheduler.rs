// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic work: the dispatch cycle and the retention sweep.
//!
//! Both activities run on one task, so a sweep never overlaps a dispatch
//! cycle. Shutdown is observed between activities; a cycle in progress
//! always runs to completion.

use spool_adapters::Transport;
use spool_core::{Clock, SystemClock};
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::lifecycle::Guard;
use crate::queue::{sweep, CycleReport, Dispatcher, SweepReport};

/// Owns the watched directory for the life of the daemon.
pub struct Scheduler<T: Transport, C: Clock = SystemClock> {
    config: Config,
    guard: Guard,
    dispatcher: Dispatcher<T>,
    clock: C,
}

impl<T: Transport, C: Clock + 'static> Scheduler<T, C> {
    pub fn new(config: Config, guard: Guard, transport: T, clock: C) -> Self {
        let dispatcher =
            Dispatcher::new(config.directory.clone(), transport, config.dispatch_concurrency);
        Self { config, guard, dispatcher, clock }
    }

    pub async fn dispatch_cycle(&self) -> CycleReport {
        self.dispatcher.run_cycle().await
    }

    /// Run the retention sweep on the blocking pool.
    pub async fn sweep(&self) -> SweepReport {
        let directory = self.config.directory.clone();
        let control_file = self.config.control_file.clone();
        let max_age = self.config.max_age;
        let clock = self.clock.clone();
        let task = tokio::task::spawn_blocking(move || {
            sweep(&directory, &control_file, max_age, &clock)
        });
        match task.await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "sweep task failed");
                SweepReport::default()
            }
        }
    }

    /// Run until `shutdown` is cancelled, then sweep once more and release
    /// the guard.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut dispatch = interval(self.config.poll_interval);
        dispatch.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let first_sweep = Instant::now() + self.config.sweep_initial_delay;
        let mut retention = interval_at(first_sweep, self.config.sweep_interval);
        retention.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = dispatch.tick() => {
                    self.dispatch_cycle().await;
                }
                _ = retention.tick() => {
                    self.sweep().await;
                }
            }
        }

        self.shutdown().await;
    }

    /// Final retention sweep, then release ownership of the directory.
    pub async fn shutdown(self) {
        info!(directory = %self.config.directory.display(), "shutting down");
        self.sweep().await;
        self.guard.release();
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
