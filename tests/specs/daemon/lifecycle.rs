// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ownership and exit-code specs
//!
//! One daemon per directory: a second instance exits successfully without
//! touching anything, and a graceful shutdown releases the directory.

use crate::prelude::*;
use std::time::{Duration, Instant};

#[test]
fn existing_control_file_exits_zero_untouched() {
    let spool = Spool::empty();
    let control = spool.file(CONTROL_FILE, "someone else\n");
    spool.file("job.PENDING", "http://127.0.0.1:9/svc\n<a/>");
    let before = std::fs::metadata(&control).unwrap().modified().unwrap();

    spool.spoold().assert().success();

    assert_eq!(spool.read(CONTROL_FILE), "someone else\n");
    assert_eq!(std::fs::metadata(&control).unwrap().modified().unwrap(), before);
    assert!(spool.exists("job.PENDING"), "no job is claimed by the losing instance");
}

#[test]
fn second_instance_leaves_running_owner_alone() {
    let spool = Spool::empty();
    let daemon = spool.start();
    let stamp = spool.read(CONTROL_FILE);

    spool.spoold().assert().success();

    assert_eq!(spool.read(CONTROL_FILE), stamp);
    let (code, log) = daemon.terminate();
    assert_eq!(code, Some(0), "log:\n{log}");
}

#[test]
fn control_file_records_owner() {
    let spool = Spool::empty();
    let daemon = spool.start();

    let stamp = spool.read(CONTROL_FILE);
    assert!(stamp.contains("pid:"), "control file: {stamp}");
    assert!(stamp.contains("started:"), "control file: {stamp}");
    drop(daemon);
}

#[test]
fn sigterm_releases_directory() {
    let spool = Spool::empty();
    let daemon = spool.start();

    let (code, log) = daemon.terminate();

    assert_eq!(code, Some(0), "log:\n{log}");
    assert!(!spool.control_path().exists());
    assert!(!spool.dir().exists(), "empty directory is removed on shutdown");
}

#[test]
fn sigterm_as_soon_as_control_file_appears_still_releases() {
    for _ in 0..10 {
        let spool = Spool::empty();
        let daemon = spool.spawn();

        // Spin instead of sleeping so the signal lands right after the guard is taken
        let deadline = Instant::now() + Duration::from_millis(SPEC_WAIT_MAX_MS);
        while !spool.control_path().exists() {
            assert!(Instant::now() < deadline, "daemon never created its control file");
            std::thread::yield_now();
        }
        let (code, log) = daemon.terminate();

        assert_eq!(code, Some(0), "log:\n{log}");
        assert!(!spool.control_path().exists(), "control file left behind, log:\n{log}");
    }
}

#[test]
fn control_file_with_job_suffix_is_rejected() {
    let spool = Spool::empty();
    let mut cmd = Command::cargo_bin("spoold").unwrap();
    for var in ["SPOOL_CONFIG", "SPOOL_DIR", "SPOOL_CONTROL_FILE"] {
        cmd.env_remove(var);
    }

    cmd.arg("--dir").arg(spool.dir()).arg("--control-file").arg("owner.PENDING").assert().code(1);

    assert!(!spool.exists("owner.PENDING"));
    assert!(!spool.exists("owner.DONE"));
}

#[test]
fn unparseable_poll_interval_exits_one() {
    let spool = Spool::empty();

    let output = spool.spoold().env("SPOOL_POLL_MS", "soon").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("SPOOL_POLL_MS"));
    assert!(!spool.control_path().exists());
}

#[test]
fn sigterm_keeps_directory_with_jobs() {
    let spool = Spool::empty();
    let daemon = spool.start();
    spool.file("leftover.txt", "not a job");

    let (code, _) = daemon.terminate();

    assert_eq!(code, Some(0));
    assert!(!spool.control_path().exists());
    assert!(spool.exists("leftover.txt"));
}

#[test]
fn missing_directory_is_created() {
    let spool = Spool::empty();
    std::fs::remove_dir(spool.dir()).unwrap();

    let daemon = spool.start();

    assert!(spool.dir().is_dir());
    drop(daemon);
}

#[test]
fn missing_required_setting_exits_one() {
    let spool = Spool::empty();
    let mut cmd = Command::cargo_bin("spoold").unwrap();
    for var in ["SPOOL_CONFIG", "SPOOL_DIR", "SPOOL_CONTROL_FILE"] {
        cmd.env_remove(var);
    }

    let output = cmd.arg("--control-file").arg(CONTROL_FILE).current_dir(spool.root()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("directory"), "stderr: {stderr}");
}

#[test]
fn config_file_supplies_settings() {
    let spool = Spool::empty();
    let config = spool.root().join("spool.toml");
    std::fs::write(
        &config,
        format!("directory = {:?}\ncontrol_file = \"other.lock\"\n", spool.dir().display().to_string()),
    )
    .unwrap();
    spool.file("other.lock", "held");

    let mut cmd = Command::cargo_bin("spoold").unwrap();
    for var in ["SPOOL_DIR", "SPOOL_CONTROL_FILE"] {
        cmd.env_remove(var);
    }
    // The control file from the config exists, so this instance stands down
    cmd.arg("--config").arg(&config).assert().success();

    assert_eq!(spool.read("other.lock"), "held");
}

#[test]
fn malformed_config_file_exits_one() {
    let spool = Spool::empty();
    let config = spool.root().join("spool.toml");
    std::fs::write(&config, "directory = [").unwrap();

    spool.spoold().arg("--config").arg(&config).assert().code(1);
}
