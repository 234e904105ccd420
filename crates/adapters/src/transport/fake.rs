// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake transport for testing: records sends, replays a scripted inbound queue.

use super::{InboundMessage, Transport, TransportError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub text: String,
}

struct FakeTransportState {
    sent: Vec<SentMessage>,
    inbound: VecDeque<InboundMessage>,
    fail_next_send: bool,
}

#[derive(Clone)]
pub struct FakeTransport {
    inner: Arc<Mutex<FakeTransportState>>,
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeTransportState {
                sent: Vec::new(),
                inbound: VecDeque::new(),
                fail_next_send: false,
            })),
        }
    }
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.inner.lock().sent.clone()
    }

    /// Queue a message to be returned by the next `poll_inbound` call.
    pub fn push_inbound(&self, text: impl Into<String>) {
        self.inner.lock().inbound.push_back(InboundMessage { text: text.into() });
    }

    /// Make the next `send` call fail, for exercising retry/drop paths.
    pub fn fail_next_send(&self) {
        self.inner.lock().fail_next_send = true;
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, text: &str) -> Result<(), TransportError> {
        let mut state = self.inner.lock();
        if state.fail_next_send {
            state.fail_next_send = false;
            return Err(TransportError::SendFailed("forced failure".into()));
        }
        state.sent.push(SentMessage { text: text.to_string() });
        Ok(())
    }

    async fn poll_inbound(&self) -> Option<InboundMessage> {
        self.inner.lock().inbound.pop_front()
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
