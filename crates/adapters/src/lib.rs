// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! telewatch-adapters: transport, advisor, and source-adapter implementations.

pub mod advisor;
mod env;
pub mod source;
pub mod transport;

pub use advisor::{Advisor, AdvisorError, AdvisorResult, ContextRecord, HttpAdvisor, NoOpAdvisor, Quota};
pub use source::{backoff_delay, FileTailer, JournalReader, PidWatcher, SourceAdapter, SourceError};
pub use transport::{
    split_for_transport, InboundMessage, NoOpTransport, TelegramTransport, Transport,
    TransportError, MAX_MESSAGE_LEN,
};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use advisor::FakeAdvisor;
#[cfg(any(test, feature = "test-support"))]
pub use transport::{FakeTransport, SentMessage};
