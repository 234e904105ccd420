// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telegram bot transport: outbound `sendMessage`, inbound via long-polled `getUpdates`.

use super::{InboundMessage, Transport, TransportError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Retry schedule for outbound sends (§7: "exponential backoff 1s, 2s, 4s, 8s, 16s, max 5 attempts").
const RETRY_DELAYS_SECS: [u64; 5] = [1, 2, 4, 8, 16];

struct PollState {
    /// `update_id` offset for the next `getUpdates` call; advances past every update seen.
    offset: i64,
}

#[derive(Clone)]
pub struct TelegramTransport {
    client: reqwest::Client,
    bot_token: String,
    chat_id: String,
    poll_state: Arc<Mutex<PollState>>,
    /// Sends dropped after exhausting retries, surfaced in the next `/status` reply.
    dropped_count: Arc<AtomicU32>,
}

impl TelegramTransport {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            poll_state: Arc::new(Mutex::new(PollState { offset: 0 })),
            dropped_count: Arc::new(AtomicU32::new(0)),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.bot_token, method)
    }

    /// Number of outbound sends dropped after exhausting the retry budget.
    pub fn dropped_count(&self) -> u32 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    async fn send_once(&self, text: &str) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&serde_json::json!({ "chat_id": self.chat_id, "text": text }))
            .send()
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(TransportError::SendFailed(format!(
                "telegram returned status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send(&self, text: &str) -> Result<(), TransportError> {
        for delay_secs in RETRY_DELAYS_SECS {
            match self.send_once(text).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(error = %e, delay_secs, "telegram send failed, retrying");
                    tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                }
            }
        }
        match self.send_once(text).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.dropped_count.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    async fn poll_inbound(&self) -> Option<InboundMessage> {
        let offset = self.poll_state.lock().offset;
        let response = self
            .client
            .get(self.api_url("getUpdates"))
            .query(&[("offset", offset.to_string()), ("timeout", "0".into())])
            .send()
            .await
            .ok()?;
        let body: serde_json::Value = response.json().await.ok()?;
        let updates = body.get("result")?.as_array()?;
        let mut latest_offset = offset;
        let mut message = None;
        for update in updates {
            if let Some(update_id) = update.get("update_id").and_then(|v| v.as_i64()) {
                latest_offset = latest_offset.max(update_id + 1);
            }
            if message.is_none() {
                if let Some(text) = update
                    .get("message")
                    .and_then(|m| m.get("text"))
                    .and_then(|t| t.as_str())
                {
                    message = Some(InboundMessage {
                        text: text.to_string(),
                    });
                }
            }
        }
        self.poll_state.lock().offset = latest_offset;
        message
    }
}

#[cfg(test)]
#[path = "telegram_tests.rs"]
mod tests;
