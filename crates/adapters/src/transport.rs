// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound request transport.
//!
//! The dispatcher only needs one call: send a payload to an endpoint,
//! optionally with basic-auth credentials, and get the raw response bytes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use spool_core::Credentials;
use thiserror::Error;

/// Errors from transport operations
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} answered HTTP {status}: {body}")]
    Status { endpoint: String, status: u16, body: String },
}

impl TransportError {
    fn from_reqwest(endpoint: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            TransportError::Timeout { endpoint: endpoint.to_string() }
        } else {
            TransportError::Request { endpoint: endpoint.to_string(), source }
        }
    }
}

/// Adapter for delivering a job's payload
#[async_trait]
pub trait Transport: Clone + Send + Sync + 'static {
    /// Send `payload` to `endpoint` and return the raw response body.
    async fn send(
        &self,
        endpoint: &str,
        credentials: Option<&Credentials>,
        payload: &str,
    ) -> Result<Vec<u8>, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Covers connect, send and the full response body.
    pub timeout: Duration,
    pub content_type: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), content_type: "text/xml; charset=utf-8".into() }
    }
}

/// HTTP `POST` transport.
///
/// Any 2xx status is a success; its body is the response. Other statuses
/// are reported as [`TransportError::Status`] with the body for context.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    content_type: String,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self { client, content_type: config.content_type })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        endpoint: &str,
        credentials: Option<&Credentials>,
        payload: &str,
    ) -> Result<Vec<u8>, TransportError> {
        let mut request = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, &self.content_type)
            .body(payload.to_string());
        if let Some(credentials) = credentials {
            request = request.header(AUTHORIZATION, credentials.basic_auth_header());
        }

        tracing::debug!(endpoint, bytes = payload.len(), "sending request");
        let response =
            request.send().await.map_err(|e| TransportError::from_reqwest(endpoint, e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| TransportError::from_reqwest(endpoint, e))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).trim().to_string(),
            });
        }

        tracing::debug!(endpoint, status = status.as_u16(), bytes = body.len(), "received response");
        Ok(body.to_vec())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{Transport, TransportError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use spool_core::Credentials;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Recorded send
    #[derive(Debug, Clone)]
    pub struct SendCall {
        pub endpoint: String,
        /// `Authorization` header that a real transport would send
        pub authorization: Option<String>,
        pub payload: String,
    }

    struct FakeTransportState {
        calls: Vec<SendCall>,
        response: Vec<u8>,
        failures: HashMap<String, String>,
    }

    /// Fake transport for testing
    #[derive(Clone)]
    pub struct FakeTransport {
        inner: Arc<Mutex<FakeTransportState>>,
    }

    impl Default for FakeTransport {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeTransportState {
                    calls: Vec::new(),
                    response: b"<ok/>".to_vec(),
                    failures: HashMap::new(),
                })),
            }
        }
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Body returned by every successful send
        pub fn respond_with(&self, body: impl Into<Vec<u8>>) {
            self.inner.lock().response = body.into();
        }

        /// Make sends to `endpoint` fail with HTTP 503
        pub fn fail_endpoint(&self, endpoint: &str, message: &str) {
            self.inner.lock().failures.insert(endpoint.to_string(), message.to_string());
        }

        /// Get all recorded sends
        pub fn calls(&self) -> Vec<SendCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send(
            &self,
            endpoint: &str,
            credentials: Option<&Credentials>,
            payload: &str,
        ) -> Result<Vec<u8>, TransportError> {
            let mut inner = self.inner.lock();
            inner.calls.push(SendCall {
                endpoint: endpoint.to_string(),
                authorization: credentials.map(Credentials::basic_auth_header),
                payload: payload.to_string(),
            });
            match inner.failures.get(endpoint) {
                Some(message) => Err(TransportError::Status {
                    endpoint: endpoint.to_string(),
                    status: 503,
                    body: message.clone(),
                }),
                None => Ok(inner.response.clone()),
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeTransport, SendCall};

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
