// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op transport: discards sends, never has inbound messages.

use super::{InboundMessage, Transport, TransportError};
use async_trait::async_trait;

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpTransport;

impl NoOpTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for NoOpTransport {
    async fn send(&self, _text: &str) -> Result<(), TransportError> {
        Ok(())
    }

    async fn poll_inbound(&self) -> Option<InboundMessage> {
        None
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
