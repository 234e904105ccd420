// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Follows a systemd unit's journal via a `journalctl -f` subprocess (§4.1).
//!
//! A native binding (e.g. `libsystemd`'s `sd_journal_*` API) would avoid the
//! subprocess, but the teacher's own event-emission adapter shells out rather
//! than binds a native library, and that's the lower-risk choice for a unit
//! that may or may not be present on the host.

use super::{backoff_delay, SourceAdapter};
use async_trait::async_trait;
use std::process::Stdio;
use telewatch_core::{LogRecord, SourceDescriptor};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug)]
pub struct JournalReader {
    descriptor: SourceDescriptor,
    unit: String,
}

impl JournalReader {
    pub fn new(descriptor: SourceDescriptor, unit: String) -> Self {
        Self { descriptor, unit }
    }

    fn spawn_follower(&self) -> std::io::Result<tokio::process::Child> {
        Command::new("journalctl")
            .arg("-f")
            .arg("-u")
            .arg(&self.unit)
            .arg("--output=cat")
            .arg("--no-pager")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
    }
}

#[async_trait]
impl SourceAdapter for JournalReader {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    async fn run(self: Box<Self>, tx: mpsc::Sender<LogRecord>, mut shutdown: oneshot::Receiver<()>) {
        let mut attempt = 0u32;
        let mut seq = 0u64;

        loop {
            let mut child = match self.spawn_follower() {
                Ok(child) => child,
                Err(e) => {
                    tracing::warn!(unit = %self.unit, error = %e, "failed to spawn journalctl, retrying");
                    let delay = backoff_delay(attempt);
                    attempt = attempt.saturating_add(1);
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => continue,
                        _ = &mut shutdown => return,
                    }
                }
            };
            attempt = 0;

            let Some(stdout) = child.stdout.take() else {
                tracing::warn!(unit = %self.unit, "journalctl child had no stdout pipe");
                continue;
            };
            let mut lines = BufReader::new(stdout).lines();

            loop {
                tokio::select! {
                    line = lines.next_line() => {
                        match line {
                            Ok(Some(line)) => {
                                // Keyword filtering happens downstream, once the
                                // profiler's bootstrap window is visible (§4.1, §4.2)
                                // — this adapter hands every line up unfiltered.
                                seq += 1;
                                let record = LogRecord::new(seq, std::time::Instant::now(), self.descriptor.id.clone(), line);
                                if tx.send(record).await.is_err() {
                                    let _ = child.kill().await;
                                    return;
                                }
                            }
                            Ok(None) => {
                                tracing::warn!(unit = %self.unit, "journalctl follower exited, respawning");
                                break;
                            }
                            Err(e) => {
                                tracing::warn!(unit = %self.unit, error = %e, "error reading journalctl output");
                                break;
                            }
                        }
                    }
                    _ = &mut shutdown => {
                        let _ = child.kill().await;
                        return;
                    }
                }
            }

            let delay = backoff_delay(attempt);
            attempt = attempt.saturating_add(1);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = &mut shutdown => return,
            }
        }
    }
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
