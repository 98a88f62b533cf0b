// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job dispatch: claim, parse, send, commit.
//!
//! ```text
//! X.PENDING --claim--> X.DOING --send ok--> X.DONE + X.RESPONSE
//!                         |
//!                         +-- invalid / send failed: stays X.DOING (orphaned)
//! ```
//!
//! The claim rename is the only synchronization between dispatchers: a
//! rename that fails with `NotFound` means another dispatcher got there
//! first. Orphaned `.DOING` files are never rolled back; the retention
//! sweep removes them after the retention window.

use std::io;
use std::path::PathBuf;

use futures_util::stream::{self, StreamExt};
use spool_adapters::Transport;
use spool_core::{InvalidJob, JobSpec, JobStatus};
use tracing::{debug, error, info, warn};

use super::{scanner, JobFile};

/// How processing of one job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Sent, renamed to `.DONE`, response written
    Completed,
    /// Another dispatcher claimed the file first
    Contended,
    /// Claim rename failed for another reason; file untouched
    ClaimFailed,
    /// Claimed but could not be read back
    ReadFailed,
    /// Claimed but malformed
    Invalid(InvalidJob),
    /// The transport reported a failure
    SendFailed,
    /// Sent, but renaming to `.DONE` or writing the response failed
    CommitFailed,
}

spool_core::simple_display! {
    JobOutcome {
        Completed => "completed",
        Contended => "contended",
        ClaimFailed => "claim failed",
        ReadFailed => "read failed",
        Invalid(..) => "invalid",
        SendFailed => "send failed",
        CommitFailed => "commit failed",
    }
}

/// Tally of one dispatch cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub scanned: usize,
    pub completed: usize,
    pub contended: usize,
    /// Jobs left untouched or orphaned by a failure
    pub failed: usize,
}

impl CycleReport {
    fn record(&mut self, outcome: &JobOutcome) {
        match outcome {
            JobOutcome::Completed => self.completed += 1,
            JobOutcome::Contended => self.contended += 1,
            _ => self.failed += 1,
        }
    }
}

/// Claims and dispatches new jobs found in one directory.
pub struct Dispatcher<T: Transport> {
    directory: PathBuf,
    transport: T,
    concurrency: usize,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(directory: impl Into<PathBuf>, transport: T, concurrency: usize) -> Self {
        Self { directory: directory.into(), transport, concurrency: concurrency.max(1) }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Scan once and process every new job. One job's failure never
    /// affects the others.
    pub async fn run_cycle(&self) -> CycleReport {
        let directory = self.directory.clone();
        let scanned = tokio::task::spawn_blocking(move || scanner::scan(&directory)).await;
        let jobs = match scanned {
            Ok(Ok(jobs)) => jobs,
            Ok(Err(e)) => {
                warn!(directory = %self.directory.display(), error = %e, "scan failed");
                return CycleReport::default();
            }
            Err(e) => {
                warn!(directory = %self.directory.display(), error = %e, "scan task failed");
                return CycleReport::default();
            }
        };

        let mut report = CycleReport { scanned: jobs.len(), ..CycleReport::default() };
        if jobs.is_empty() {
            return report;
        }

        let outcomes: Vec<JobOutcome> = stream::iter(&jobs)
            .map(|job| self.process(job))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        for outcome in &outcomes {
            report.record(outcome);
        }

        info!(
            directory = %self.directory.display(),
            scanned = report.scanned,
            completed = report.completed,
            contended = report.contended,
            failed = report.failed,
            "dispatch cycle"
        );
        report
    }

    /// Drive one `.PENDING` job through the protocol.
    pub async fn process(&self, job: &JobFile) -> JobOutcome {
        let stem = job.stem.as_str();

        // 1. Claim
        let doing = job.path_for(JobStatus::Doing);
        if let Err(e) = tokio::fs::rename(&job.path, &doing).await {
            if e.kind() == io::ErrorKind::NotFound {
                debug!(job = stem, "already claimed elsewhere");
                return JobOutcome::Contended;
            }
            warn!(job = stem, path = %job.path.display(), error = %e, "failed to claim job");
            return JobOutcome::ClaimFailed;
        }
        debug!(job = stem, "claimed");

        // 2. Parse
        let bytes = match tokio::fs::read(&doing).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(job = stem, error = %e, "failed to read claimed job, left in progress");
                return JobOutcome::ReadFailed;
            }
        };
        let spec = match JobSpec::parse(&bytes) {
            Ok(spec) => spec,
            Err(reason) => {
                error!(job = stem, %reason, "invalid job, left in progress");
                return JobOutcome::Invalid(reason);
            }
        };

        // 3. Dispatch
        let endpoint = spec.endpoint.as_str();
        let response =
            match self.transport.send(endpoint, spec.credentials.as_ref(), &spec.payload).await {
                Ok(response) => response,
                Err(e) => {
                    error!(job = stem, endpoint, error = %e, "request failed, left in progress");
                    return JobOutcome::SendFailed;
                }
            };

        // 4. Commit: mark done first, then persist the response
        let done = job.path_for(JobStatus::Done);
        if let Err(e) = tokio::fs::rename(&doing, &done).await {
            error!(job = stem, error = %e, "failed to mark job done, response discarded");
            return JobOutcome::CommitFailed;
        }
        let response_path = job.path_for(JobStatus::Response);
        if let Err(e) = tokio::fs::write(&response_path, &response).await {
            error!(
                job = stem,
                path = %response_path.display(),
                error = %e,
                "failed to write response"
            );
            return JobOutcome::CommitFailed;
        }

        info!(job = stem, endpoint, bytes = response.len(), "job completed");
        JobOutcome::Completed
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
