// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for specs.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub use assert_cmd::prelude::*;
pub use std::process::Command;

/// Upper bound for any single wait in a spec.
pub const SPEC_WAIT_MAX_MS: u64 = 5_000;

pub const CONTROL_FILE: &str = "spoold.lock";

/// Poll `check` every 20ms until it returns true or `max_ms` elapses.
pub fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    check()
}

/// A temporary watched directory.
pub struct Spool {
    root: tempfile::TempDir,
}

impl Spool {
    pub fn empty() -> Self {
        let spool = Self { root: tempfile::tempdir().unwrap() };
        std::fs::create_dir_all(spool.dir()).unwrap();
        spool
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn dir(&self) -> PathBuf {
        self.root.path().join("queue")
    }

    pub fn control_path(&self) -> PathBuf {
        self.dir().join(CONTROL_FILE)
    }

    /// Write `name` atomically: the content lands under a scratch name that
    /// the daemon ignores, then is renamed into place.
    pub fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir().join(name);
        let scratch = self.dir().join(format!(".{name}.part"));
        std::fs::write(&scratch, content).unwrap();
        std::fs::rename(&scratch, &path).unwrap();
        path
    }

    pub fn exists(&self, name: &str) -> bool {
        self.dir().join(name).exists()
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir().join(name)).unwrap()
    }

    /// `spoold` pointed at this directory, with a clean environment and a
    /// fast poll interval.
    pub fn spoold(&self) -> Command {
        let mut cmd = Command::cargo_bin("spoold").unwrap();
        for var in ["SPOOL_CONFIG", "SPOOL_DIR", "SPOOL_CONTROL_FILE", "SPOOL_SWEEP_MS"] {
            cmd.env_remove(var);
        }
        cmd.env("SPOOL_POLL_MS", "50")
            .env("RUST_LOG", "debug,reqwest=info,hyper=info")
            .arg("--dir")
            .arg(self.dir())
            .arg("--control-file")
            .arg(CONTROL_FILE);
        cmd
    }

    /// Start `spoold` in the background and wait until it owns the directory.
    pub fn start(&self) -> Daemon {
        let daemon = self.spawn();
        let owned = wait_for(SPEC_WAIT_MAX_MS, || self.control_path().exists());
        assert!(owned, "daemon should create its control file");
        daemon
    }

    /// Start `spoold` in the background without waiting for it.
    pub fn spawn(&self) -> Daemon {
        let log_path = self.root().join("spoold.log");
        let log = std::fs::File::create(&log_path).unwrap();
        let child = self
            .spoold()
            .stdout(Stdio::null())
            .stderr(Stdio::from(log))
            .spawn()
            .expect("spawn spoold");
        Daemon { child, log_path }
    }
}

/// A running daemon, killed on drop if still alive.
pub struct Daemon {
    child: Child,
    log_path: PathBuf,
}

impl Daemon {
    /// Send `SIGTERM` and wait for the exit code. Returns the log as well.
    pub fn terminate(mut self) -> (Option<i32>, String) {
        let status = Command::new("kill")
            .args(["-TERM", &self.child.id().to_string()])
            .status()
            .unwrap();
        assert!(status.success(), "kill -TERM failed");
        let deadline = Instant::now() + Duration::from_millis(SPEC_WAIT_MAX_MS);
        while Instant::now() < deadline {
            if let Some(status) = self.child.try_wait().unwrap() {
                return (status.code(), self.log());
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        (None, self.log())
    }

    /// Everything the daemon has logged so far.
    pub fn log(&self) -> String {
        std::fs::read_to_string(&self.log_path).unwrap_or_default()
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// A request captured by [`Endpoint`].
#[derive(Debug, Clone)]
pub struct Captured {
    pub head: String,
    pub body: String,
}

/// A local HTTP endpoint answering every request with a fixed status and body.
pub struct Endpoint {
    pub url: String,
    requests: Arc<Mutex<Vec<Captured>>>,
}

impl Endpoint {
    pub fn serve(status: u16, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/service", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let captured = Arc::clone(&requests);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let Some(request) = read_request(&mut stream) else { continue };
                captured.lock().unwrap().push(request);
                let reply = format!(
                    "HTTP/1.1 {status} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(reply.as_bytes());
            }
        });

        Self { url, requests }
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.requests.lock().unwrap().clone()
    }
}

fn read_request(stream: &mut impl Read) -> Option<Captured> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let split = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..split]).into_owned();
    let length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok())?
        })
        .unwrap_or(0);
    while buf.len() < split + length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = String::from_utf8_lossy(&buf[split..]).into_owned();
    Some(Captured { head, body })
}
