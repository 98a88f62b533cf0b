// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for the outside world: the outbound request transport.

pub mod transport;

pub use transport::{HttpTransport, HttpTransportConfig, Transport, TransportError};

#[cfg(any(test, feature = "test-support"))]
pub use transport::{FakeTransport, SendCall};
