// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution guard: one daemon per watched directory.
//!
//! The guard is a control file inside the watched directory plus an
//! exclusive advisory lock held on it for the life of the process. A daemon
//! that finds the control file already present leaves everything as it is
//! and reports [`LifecycleError::AlreadyRunning`].

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, info, warn};

use super::LifecycleError;
use crate::config::Config;

/// Exclusive ownership of a watched directory.
///
/// Released by [`Guard::release`] or, failing that, on drop.
#[derive(Debug)]
pub struct Guard {
    directory: PathBuf,
    control_path: PathBuf,
    // NOTE(lifetime): Held to maintain exclusive file lock; None once released
    lock_file: Option<File>,
}

impl Guard {
    /// Take ownership of `config.directory`.
    pub fn acquire(config: &Config) -> Result<Self, LifecycleError> {
        let control_path = config.control_path();

        // 1. Someone else's control file: report and leave it untouched
        if control_path.try_exists()? {
            report_existing(&control_path);
            return Err(LifecycleError::AlreadyRunning(control_path));
        }

        // 2. Create the directory and claim the control file atomically
        fs::create_dir_all(&config.directory).map_err(|source| {
            LifecycleError::CreateDir { path: config.directory.clone(), source }
        })?;
        let file = match OpenOptions::new().write(true).create_new(true).open(&control_path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                info!(path = %control_path.display(), "lost race for control file");
                return Err(LifecycleError::AlreadyRunning(control_path));
            }
            Err(e) => return Err(LifecycleError::Io(e)),
        };

        // 3. Lock and stamp it. The file is ours now, so remove it on failure.
        if let Err(e) = lock_and_stamp(&file, &control_path) {
            drop(file);
            if let Err(rm) = fs::remove_file(&control_path) {
                warn!(path = %control_path.display(), error = %rm, "failed to remove control file");
            }
            return Err(e);
        }

        info!(path = %control_path.display(), "acquired execution guard");
        Ok(Self { directory: config.directory.clone(), control_path, lock_file: Some(file) })
    }

    pub fn control_path(&self) -> &Path {
        &self.control_path
    }

    /// Unlock and delete the control file, then remove the directory if it
    /// is empty. Every step is best-effort.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        let Some(file) = self.lock_file.take() else {
            return;
        };

        if let Err(e) = FileExt::unlock(&file) {
            warn!(path = %self.control_path.display(), error = %e, "failed to unlock control file");
        }
        drop(file);

        if let Err(e) = fs::remove_file(&self.control_path) {
            warn!(path = %self.control_path.display(), error = %e, "failed to remove control file");
        }

        // Not atomic: a producer may drop a job between the check and the removal,
        // in which case remove_dir fails and the directory stays.
        match is_empty_dir(&self.directory) {
            Ok(true) => match fs::remove_dir(&self.directory) {
                Ok(()) => debug!(path = %self.directory.display(), "removed empty directory"),
                Err(e) => {
                    warn!(path = %self.directory.display(), error = %e, "failed to remove directory");
                }
            },
            Ok(false) => {}
            Err(e) => {
                warn!(path = %self.directory.display(), error = %e, "failed to inspect directory");
            }
        }

        info!(path = %self.control_path.display(), "released execution guard");
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        self.release_inner();
    }
}

fn lock_and_stamp(file: &File, path: &Path) -> Result<(), LifecycleError> {
    // Blocking is fine here: we created the file, so the only other lockers
    // are momentary probes from starting instances.
    file.lock_exclusive()
        .map_err(|source| LifecycleError::LockFailed { path: path.to_path_buf(), source })?;
    let mut writer = file;
    writer.write_all(ownership_message().as_bytes())?;
    writer.sync_all()?;
    Ok(())
}

fn ownership_message() -> String {
    let host = hostname::get().map(|h| h.to_string_lossy().into_owned()).unwrap_or_default();
    format!(
        "spoold running\npid: {}\nhost: {}\nuser: {}\nstarted: {}\n",
        std::process::id(),
        host,
        whoami::username(),
        chrono::Utc::now().to_rfc3339(),
    )
}

/// Log who holds an existing control file. Read-only; the probe lock is
/// dropped immediately.
fn report_existing(path: &Path) {
    let held = match File::open(path) {
        Ok(file) => match file.try_lock_exclusive() {
            Ok(()) => {
                let _ = FileExt::unlock(&file);
                false
            }
            Err(_) => true,
        },
        Err(e) => {
            debug!(path = %path.display(), error = %e, "could not probe control file");
            true
        }
    };

    if held {
        info!(path = %path.display(), "another instance owns this directory, exiting");
    } else {
        warn!(
            path = %path.display(),
            "control file exists but no instance holds its lock; remove it to start a new owner"
        );
    }
}

fn is_empty_dir(path: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
