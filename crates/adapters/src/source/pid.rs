// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Polls the process table for a PID's lifecycle and memory footprint (§4.1).
//!
//! Emits synthetic records (not parsed log lines) on state transitions:
//! started, stopped (with exit status if available), and RSS crossing 80%
//! of a configured cap.

use super::SourceAdapter;
use async_trait::async_trait;
use std::time::Duration;
use sysinfo::{Pid, System};
use telewatch_core::{LogRecord, SourceDescriptor};
use tokio::sync::{mpsc, oneshot};

/// Fraction of the configured RSS cap that triggers a one-time warning record.
const RSS_WARNING_FRACTION: f64 = 0.80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObservedState {
    NotYetSeen,
    Running,
    Stopped,
}

#[derive(Debug)]
pub struct PidWatcher {
    descriptor: SourceDescriptor,
    pid: u32,
    check_interval: Duration,
    rss_cap_bytes: Option<u64>,
}

impl PidWatcher {
    pub fn new(descriptor: SourceDescriptor, pid: u32, check_interval: Duration, rss_cap_bytes: Option<u64>) -> Self {
        Self {
            descriptor,
            pid,
            check_interval,
            rss_cap_bytes,
        }
    }
}

#[async_trait]
impl SourceAdapter for PidWatcher {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    async fn run(self: Box<Self>, tx: mpsc::Sender<LogRecord>, mut shutdown: oneshot::Receiver<()>) {
        let mut system = System::new();
        let pid = Pid::from_u32(self.pid);
        let mut state = ObservedState::NotYetSeen;
        let mut rss_warned = false;
        let mut seq = 0u64;

        loop {
            system.refresh_process(pid);
            let process = system.process(pid);

            match (state, process) {
                (ObservedState::NotYetSeen, Some(_)) => {
                    state = ObservedState::Running;
                    emit(&tx, &self.descriptor, &mut seq, "process started").await;
                }
                (ObservedState::Running, None) => {
                    state = ObservedState::Stopped;
                    emit(&tx, &self.descriptor, &mut seq, "process stopped").await;
                    return;
                }
                (ObservedState::NotYetSeen, None) => {}
                _ => {}
            }

            if let (Some(process), Some(cap)) = (process, self.rss_cap_bytes) {
                let rss = process.memory();
                if !rss_warned && cap > 0 && rss as f64 / cap as f64 >= RSS_WARNING_FRACTION {
                    rss_warned = true;
                    emit(
                        &tx,
                        &self.descriptor,
                        &mut seq,
                        &format!("rss crossed {}% of configured cap", (RSS_WARNING_FRACTION * 100.0) as u32),
                    )
                    .await;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.check_interval) => {}
                _ = &mut shutdown => return,
            }
        }
    }
}

async fn emit(tx: &mpsc::Sender<LogRecord>, descriptor: &SourceDescriptor, seq: &mut u64, line: &str) {
    *seq += 1;
    let record = LogRecord::new(*seq, std::time::Instant::now(), descriptor.id.clone(), line.to_string());
    let _ = tx.send(record).await;
}

#[cfg(test)]
#[path = "pid_tests.rs"]
mod tests;
