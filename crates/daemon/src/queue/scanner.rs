// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory scan for new jobs.

use std::io;
use std::path::Path;

use tracing::debug;

use super::JobFile;

/// Snapshot of the `.PENDING` regular files directly inside `directory`.
///
/// Sorted by path so a cycle processes jobs in a stable order. A missing
/// directory is an empty queue.
pub fn scan(directory: &Path) -> io::Result<Vec<JobFile>> {
    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(directory = %directory.display(), "directory does not exist yet");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut jobs = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                debug!(directory = %directory.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        let job = match JobFile::from_path(&path) {
            Ok(Some(job)) if job.status.is_new() => job,
            Ok(_) => continue,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping file");
                continue;
            }
        };

        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => jobs.push(job),
            Ok(_) => debug!(path = %path.display(), "skipping non-regular file"),
            // Vanished between listing and stat: claimed elsewhere
            Err(e) => debug!(path = %path.display(), error = %e, "skipping file"),
        }
    }

    jobs.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(jobs)
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
