// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source adapters: file tailer, PID watcher, journal reader (§4.1).

mod file;
mod journal;
mod pid;

pub use file::FileTailer;
pub use journal::JournalReader;
pub use pid::PidWatcher;

use async_trait::async_trait;
use telewatch_core::{LogRecord, SourceDescriptor};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open source: {0}")]
    OpenFailed(String),
}

/// A running source: produces records onto `tx` until `shutdown` fires or
/// the underlying resource is gone for good. Each adapter owns one task
/// (§5), so `run` consumes `self`.
#[async_trait]
pub trait SourceAdapter: std::fmt::Debug + Send + 'static {
    fn descriptor(&self) -> &SourceDescriptor;

    async fn run(self: Box<Self>, tx: mpsc::Sender<LogRecord>, shutdown: oneshot::Receiver<()>);
}

/// Exponential backoff schedule for a source that disappears mid-run (§4.1):
/// "retry with exponential backoff (1s, 2s, 4s, ..., capped at 60s)".
pub fn backoff_delay(attempt: u32) -> std::time::Duration {
    let secs = 1u64.checked_shl(attempt).unwrap_or(u64::MAX).min(60);
    std::time::Duration::from_secs(secs)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
