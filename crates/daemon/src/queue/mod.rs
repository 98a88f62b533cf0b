// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The file-based job queue: scanning, dispatch and retention.

pub mod dispatch;
pub mod scanner;
pub mod sweep;

pub use dispatch::{CycleReport, Dispatcher, JobOutcome};
pub use scanner::scan;
pub use sweep::{sweep, SweepReport};

use std::path::{Path, PathBuf};

use spool_core::status::{self, JobStatus, StatusError};

/// A job file observed in the watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFile {
    pub path: PathBuf,
    pub stem: String,
    pub status: JobStatus,
}

impl JobFile {
    /// Decode a path. `Ok(None)` for files outside the status protocol.
    pub fn from_path(path: &Path) -> Result<Option<Self>, StatusError> {
        let name = status::file_name(path)?;
        let (stem, suffix) = status::split(name)?;
        Ok(JobStatus::from_suffix(suffix).map(|status| Self {
            path: path.to_path_buf(),
            stem: stem.to_string(),
            status,
        }))
    }

    /// Where this job lives once it reaches `status`.
    pub fn path_for(&self, status: JobStatus) -> PathBuf {
        status::sibling(&self.path, &self.stem, status)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
