// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job status protocol and the file-name codec that carries it.
//!
//! A job's status is its file-name suffix: everything from the last `.` of
//! the base name onward. The part before is the stem, which stays stable
//! while the job is renamed from one status to the next:
//!
//! ```text
//! order-42.PENDING -> order-42.DOING -> order-42.DONE (+ order-42.RESPONSE)
//! ```
//!
//! Suffixes are matched case-insensitively on read and always written in
//! upper case.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("invalid job file name {0:?}: no status suffix")]
    InvalidName(String),
}

/// Lifecycle state of a job file, encoded in its suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// Written by producers. Consumed by the dispatcher, never assigned by it.
    New,
    /// Claimed by a dispatcher.
    Doing,
    /// Source file of a job whose request completed.
    Done,
    /// Response artifact of a completed job.
    Response,
}

crate::simple_display! {
    JobStatus {
        New => "new",
        Doing => "in-progress",
        Done => "done",
        Response => "response",
    }
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] =
        [JobStatus::New, JobStatus::Doing, JobStatus::Done, JobStatus::Response];

    /// Canonical suffix, including the leading dot.
    pub fn suffix(self) -> &'static str {
        match self {
            JobStatus::New => ".PENDING",
            JobStatus::Doing => ".DOING",
            JobStatus::Done => ".DONE",
            JobStatus::Response => ".RESPONSE",
        }
    }

    /// Parse a suffix (with its leading dot), ignoring ASCII case.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.suffix().eq_ignore_ascii_case(suffix))
    }

    /// Status of a base file name.
    ///
    /// `Ok(None)` means the name has a suffix that is not part of the protocol.
    pub fn of(name: &str) -> Result<Option<Self>, StatusError> {
        status_suffix(name).map(Self::from_suffix)
    }

    /// Statuses the daemon owns and the retention sweeper may delete.
    pub fn is_recognized(self) -> bool {
        !self.is_new()
    }

    pub fn is_new(self) -> bool {
        matches!(self, JobStatus::New)
    }
}

/// Split a base name at its last `.` into `(stem, suffix)`.
///
/// The suffix keeps the dot, so `stem + suffix == name`.
pub fn split(name: &str) -> Result<(&str, &str), StatusError> {
    match name.rfind('.') {
        Some(idx) => Ok(name.split_at(idx)),
        None => Err(StatusError::InvalidName(name.to_string())),
    }
}

/// Base name without its status suffix.
pub fn stem(name: &str) -> Result<&str, StatusError> {
    split(name).map(|(stem, _)| stem)
}

/// Status suffix of a base name, including the leading dot.
pub fn status_suffix(name: &str) -> Result<&str, StatusError> {
    split(name).map(|(_, suffix)| suffix)
}

/// True for the suffixes the daemon assigns (`.DOING`, `.DONE`, `.RESPONSE`).
pub fn is_recognized_status(suffix: &str) -> bool {
    JobStatus::from_suffix(suffix).is_some_and(JobStatus::is_recognized)
}

/// True only for the producer suffix (`.PENDING`).
pub fn is_new_job(suffix: &str) -> bool {
    JobStatus::from_suffix(suffix).is_some_and(JobStatus::is_new)
}

/// UTF-8 base name of a path.
pub fn file_name(path: &Path) -> Result<&str, StatusError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| StatusError::InvalidName(path.display().to_string()))
}

/// Path of the file for `stem` in `status`, next to `path`.
pub fn sibling(path: &Path, stem: &str, status: JobStatus) -> PathBuf {
    path.with_file_name(format!("{stem}{}", status.suffix()))
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
