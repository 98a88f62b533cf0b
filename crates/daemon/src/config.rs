// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration.
//!
//! Built once at startup from, in increasing precedence: defaults, an
//! optional TOML file, environment variables, and command-line flags.
//!
//! ```toml
//! directory = "/var/spool/requests"
//! control_file = "spoold.lock"
//! poll_interval_ms = 5000
//! max_age_secs = 3600
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use spool_core::JobStatus;
use thiserror::Error;

use crate::env;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);
const DEFAULT_SWEEP_INITIAL_DELAY: Duration = Duration::from_secs(5);
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60 * 60);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// On-disk representation. Every key is optional so that the file can be
/// partial and completed by the environment or flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub directory: Option<PathBuf>,
    pub control_file: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub sweep_interval_secs: Option<u64>,
    pub sweep_initial_delay_ms: Option<u64>,
    pub max_age_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub content_type: Option<String>,
    pub dispatch_concurrency: Option<usize>,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        toml::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }
}

/// Settings that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub directory: Option<PathBuf>,
    pub control_file: Option<String>,
    pub poll_interval: Option<Duration>,
    pub sweep_interval: Option<Duration>,
    pub max_age: Option<Duration>,
}

impl Overrides {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            directory: env::directory(),
            control_file: env::control_file(),
            poll_interval: env::poll_interval()?,
            sweep_interval: env::sweep_interval()?,
            max_age: env::max_age()?,
        })
    }
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Watched directory holding jobs, responses and the control file
    pub directory: PathBuf,
    /// Base name of the control file inside `directory`
    pub control_file: String,
    /// Period of the scan + dispatch cycle
    pub poll_interval: Duration,
    /// Period of the retention sweep
    pub sweep_interval: Duration,
    /// Delay before the first retention sweep
    pub sweep_initial_delay: Duration,
    /// Terminal files older than this are deleted
    pub max_age: Duration,
    /// Per-request transport timeout
    pub request_timeout: Duration,
    /// `Content-Type` of outbound requests
    pub content_type: String,
    /// Jobs dispatched concurrently within one cycle
    pub dispatch_concurrency: usize,
    /// Daemon log file; stderr when unset
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Configuration with defaults for everything but the two required settings.
    pub fn new(directory: impl Into<PathBuf>, control_file: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            control_file: control_file.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            sweep_initial_delay: DEFAULT_SWEEP_INITIAL_DELAY,
            max_age: DEFAULT_MAX_AGE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            dispatch_concurrency: 1,
            log_file: None,
        }
    }

    /// Load from an optional config file plus overrides.
    pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => FileConfig::read(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, overrides)
    }

    /// Merge file settings with overrides and validate the result.
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self, ConfigError> {
        let directory =
            overrides.directory.or(file.directory).ok_or(ConfigError::Missing("directory"))?;
        let control_file = overrides
            .control_file
            .or(file.control_file)
            .ok_or(ConfigError::Missing("control_file"))?;

        let mut config = Self::new(directory, control_file);
        if let Some(ms) = file.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = file.sweep_interval_secs {
            config.sweep_interval = Duration::from_secs(secs);
        }
        if let Some(ms) = file.sweep_initial_delay_ms {
            config.sweep_initial_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = file.max_age_secs {
            config.max_age = Duration::from_secs(secs);
        }
        if let Some(secs) = file.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(content_type) = file.content_type {
            config.content_type = content_type;
        }
        if let Some(n) = file.dispatch_concurrency {
            config.dispatch_concurrency = n;
        }
        config.log_file = file.log_file;

        if let Some(interval) = overrides.poll_interval {
            config.poll_interval = interval;
        }
        if let Some(interval) = overrides.sweep_interval {
            config.sweep_interval = interval;
        }
        if let Some(age) = overrides.max_age {
            config.max_age = age;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.directory.as_os_str().is_empty() {
            return Err(ConfigError::Missing("directory"));
        }
        let name = self.control_file.as_str();
        if name.is_empty() {
            return Err(ConfigError::Missing("control_file"));
        }
        if name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(invalid("control_file", format!("{name:?} must be a plain file name")));
        }
        // The scanner and sweeper would otherwise treat the guard token as a job
        if let Ok(Some(status)) = JobStatus::of(name) {
            return Err(invalid(
                "control_file",
                format!("{name:?} ends in the job suffix {}", status.suffix()),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(invalid("poll_interval", "must be greater than zero"));
        }
        if self.sweep_interval.is_zero() {
            return Err(invalid("sweep_interval", "must be greater than zero"));
        }
        if self.request_timeout.is_zero() {
            return Err(invalid("request_timeout", "must be greater than zero"));
        }
        if self.dispatch_concurrency == 0 {
            return Err(invalid("dispatch_concurrency", "must be at least 1"));
        }
        Ok(())
    }

    /// Full path of the control file.
    pub fn control_path(&self) -> PathBuf {
        self.directory.join(&self.control_file)
    }
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { key, reason: reason.into() }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
