// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spool daemon library
//!
//! Watches a directory for `.PENDING` job files, dispatches each to its
//! HTTP endpoint and records the response beside it.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod env;
pub mod lifecycle;
pub mod logging;
pub mod queue;
pub mod scheduler;

pub use config::{Config, ConfigError, Overrides};
pub use lifecycle::{startup, Guard, LifecycleError};
pub use queue::{CycleReport, Dispatcher, JobFile, JobOutcome, SweepReport};
pub use scheduler::Scheduler;
