// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! spool-core: job status protocol and job file format for the spool daemon

pub mod macros;

pub mod clock;
pub mod job;
pub mod status;

pub use clock::{Clock, FakeClock, SystemClock};
pub use job::{Credentials, InvalidJob, JobSpec};
pub use status::{is_new_job, is_recognized_status, JobStatus, StatusError};
