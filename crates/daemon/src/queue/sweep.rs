// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retention sweep for terminal and orphaned job files.
//!
//! Only statuses the daemon assigns (`.DOING`, `.DONE`, `.RESPONSE`) are
//! candidates. Unclaimed `.PENDING` jobs and the control file are never
//! deleted, whatever their age.

use std::io;
use std::path::Path;
use std::time::Duration;

use spool_core::Clock;
use tracing::{debug, info, warn};

use super::JobFile;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub deleted: usize,
    pub retained: usize,
    pub failed: usize,
}

/// Delete recognized files in `directory` whose age exceeds `max_age`.
///
/// Failures are logged per file and never abort the sweep.
pub fn sweep(
    directory: &Path,
    control_file: &str,
    max_age: Duration,
    clock: &impl Clock,
) -> SweepReport {
    let mut report = SweepReport::default();

    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return report,
        Err(e) => {
            warn!(directory = %directory.display(), error = %e, "sweep could not list directory");
            return report;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if entry.file_name() == control_file {
            continue;
        }
        let Ok(Some(job)) = JobFile::from_path(&path) else {
            continue;
        };
        if !job.status.is_recognized() {
            continue;
        }

        let modified = match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => meta.modified(),
            Ok(_) => continue,
            Err(e) => Err(e),
        };
        let age = match modified {
            Ok(modified) => clock.age_of(modified),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "sweep could not stat file");
                continue;
            }
        };

        if age <= max_age {
            report.retained += 1;
            continue;
        }

        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(job = %job.stem, status = %job.status, age_secs = age.as_secs(), "deleted expired file");
                report.deleted += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to delete expired file");
                report.failed += 1;
            }
        }
    }

    if report.deleted > 0 || report.failed > 0 {
        info!(
            directory = %directory.display(),
            deleted = report.deleted,
            failed = report.failed,
            retained = report.retained,
            "retention sweep"
        );
    }
    report
}

#[cfg(test)]
#[path = "sweep_tests.rs"]
mod tests;
