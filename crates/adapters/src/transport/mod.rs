// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound/inbound chat transport (§4.6, §6 "Transport wire format").

mod noop;
mod telegram;

pub use noop::NoOpTransport;
pub use telegram::TelegramTransport;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeTransport, SentMessage};

use async_trait::async_trait;
use thiserror::Error;

/// Maximum characters in a single outbound message; longer messages are
/// split at line boundaries before calling `send` (§6).
pub const MAX_MESSAGE_LEN: usize = 4096;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// An inbound message from the chat platform's control channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub text: String,
}

impl InboundMessage {
    /// Inbound text beginning with `/` is a command; everything else is ignored (§6).
    pub fn is_command(&self) -> bool {
        self.text.starts_with('/')
    }
}

/// Split `text` into chunks of at most `MAX_MESSAGE_LEN` characters, breaking
/// only at line boundaries so a single line is never cut mid-word unless it
/// alone exceeds the limit.
pub fn split_for_transport(text: &str) -> Vec<String> {
    if text.chars().count() <= MAX_MESSAGE_LEN {
        return vec![text.to_string()];
    }
    let mut chunks = Vec::new();
    let mut current = String::new();
    for line in text.split_inclusive('\n') {
        if current.chars().count() + line.chars().count() > MAX_MESSAGE_LEN && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if line.chars().count() > MAX_MESSAGE_LEN {
            for chunk in line
                .chars()
                .collect::<Vec<_>>()
                .chunks(MAX_MESSAGE_LEN)
                .map(|c| c.iter().collect::<String>())
            {
                chunks.push(chunk);
            }
        } else {
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Chat transport: outbound notifications plus an inbound command stream.
#[async_trait]
pub trait Transport: Clone + Send + Sync + 'static {
    /// Send a plain-text message, already split to fit [`MAX_MESSAGE_LEN`].
    async fn send(&self, text: &str) -> Result<(), TransportError>;

    /// Poll for the next inbound message, if any arrived since the last call.
    async fn poll_inbound(&self) -> Option<InboundMessage>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
