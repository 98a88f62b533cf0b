// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job file contents.
//!
//! ```text
//! https://host/service;user:secret    <- endpoint, optional credentials
//! <soapenv:Envelope ...>              <- remaining lines: request body
//! ...
//! ```

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

/// Reasons a claimed job cannot be dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidJob {
    #[error("job file is not valid UTF-8")]
    NotUtf8,

    #[error("first line (endpoint configuration) is missing or blank")]
    MissingConfig,

    #[error("endpoint is empty")]
    MissingEndpoint,

    #[error("request body is empty")]
    EmptyPayload,
}

/// Basic-auth secret taken verbatim from the configuration line.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials(String);

impl Credentials {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value: `Basic <base64(secret)>`.
    pub fn basic_auth_header(&self) -> String {
        format!("Basic {}", STANDARD.encode(self.0.as_bytes()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(***)")
    }
}

/// Parsed job: where to send it, how to authenticate, and what to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub endpoint: String,
    pub credentials: Option<Credentials>,
    pub payload: String,
}

impl JobSpec {
    /// Parse raw job file bytes.
    ///
    /// The configuration line splits on the first `;` only; everything after
    /// it is the secret. Body lines are joined without separators.
    pub fn parse(bytes: &[u8]) -> Result<Self, InvalidJob> {
        let text = std::str::from_utf8(bytes).map_err(|_| InvalidJob::NotUtf8)?;
        let mut lines = text.lines();

        let config = lines.next().filter(|line| !line.trim().is_empty());
        let config = config.ok_or(InvalidJob::MissingConfig)?;

        let (endpoint, credentials) = match config.split_once(';') {
            Some((endpoint, secret)) if !secret.is_empty() => {
                (endpoint, Some(Credentials::new(secret)))
            }
            Some((endpoint, _)) => (endpoint, None),
            None => (config, None),
        };

        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(InvalidJob::MissingEndpoint);
        }

        let payload: String = lines.collect();
        if payload.is_empty() {
            return Err(InvalidJob::EmptyPayload);
        }

        Ok(Self { endpoint: endpoint.to_string(), credentials, payload })
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
