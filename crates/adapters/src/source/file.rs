// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tails a file, handling truncation, rotation, and partial-line buffering (§4.1).

use super::{backoff_delay, SourceAdapter, SourceError};
use async_trait::async_trait;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use telewatch_core::{LogRecord, SourceDescriptor};
use tokio::sync::{mpsc, oneshot};

#[cfg(unix)]
fn file_inode(metadata: &std::fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.ino()
}

#[cfg(not(unix))]
fn file_inode(_metadata: &std::fs::Metadata) -> u64 {
    0
}

#[derive(Debug)]
pub struct FileTailer {
    descriptor: SourceDescriptor,
    path: PathBuf,
    replay_existing: bool,
}

impl FileTailer {
    pub fn new(descriptor: SourceDescriptor, path: PathBuf, replay_existing: bool) -> Self {
        Self {
            descriptor,
            path,
            replay_existing,
        }
    }

    /// Open the file and return the offset to start reading from, honoring
    /// `replay_existing` (default: seek to end).
    fn open(&self) -> Result<(File, u64, u64), SourceError> {
        let file = File::open(&self.path).map_err(|e| SourceError::OpenFailed(e.to_string()))?;
        let metadata = file
            .metadata()
            .map_err(|e| SourceError::OpenFailed(e.to_string()))?;
        let inode = file_inode(&metadata);
        let offset = if self.replay_existing { 0 } else { metadata.len() };
        Ok((file, inode, offset))
    }
}

#[async_trait]
impl SourceAdapter for FileTailer {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    async fn run(self: Box<Self>, tx: mpsc::Sender<LogRecord>, mut shutdown: oneshot::Receiver<()>) {
        let mut attempt = 0u32;
        let mut seq = 0u64;

        let (mut file, mut inode, mut offset) = loop {
            match self.open() {
                Ok(opened) => break opened,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "source disappeared at startup, retrying");
                    let delay = backoff_delay(attempt);
                    attempt = attempt.saturating_add(1);
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = &mut shutdown => return,
                    }
                }
            }
        };

        let (notify_tx, mut notify_rx) = mpsc::channel(32);
        let _watcher = create_watcher(&self.path, notify_tx.clone());
        let mut partial_line = String::new();
        let mut last_partial_at: Option<tokio::time::Instant> = None;

        loop {
            tokio::select! {
                _ = notify_rx.recv() => {}
                _ = tokio::time::sleep(crate::env::file_watcher_poll_ms()) => {}
                _ = &mut shutdown => {
                    return;
                }
            }

            match self.path.metadata() {
                Ok(metadata) => {
                    let current_inode = file_inode(&metadata);
                    let rotated = current_inode != inode;
                    let truncated = !rotated && metadata.len() < offset;
                    if rotated || truncated {
                        tracing::info!(path = %self.path.display(), rotated, truncated, "reopening source");
                        match self.open() {
                            Ok((new_file, new_inode, _)) => {
                                file = new_file;
                                inode = new_inode;
                                offset = 0;
                                partial_line.clear();
                            }
                            Err(e) => {
                                tracing::warn!(path = %self.path.display(), error = %e, "source disappeared mid-run");
                                continue;
                            }
                        }
                    }
                }
                Err(_) => {
                    tracing::warn!(path = %self.path.display(), "source file missing, will retry");
                    continue;
                }
            }

            if file.seek(SeekFrom::Start(offset)).is_err() {
                continue;
            }
            let mut buf = Vec::new();
            if file.read_to_end(&mut buf).is_err() {
                continue;
            }
            offset += buf.len() as u64;
            partial_line.push_str(&String::from_utf8_lossy(&buf));

            // Keyword filtering happens downstream, once the profiler's
            // bootstrap window is visible (§4.1, §4.2) — this adapter hands
            // every complete line up unfiltered.
            while let Some(newline_pos) = partial_line.find('\n') {
                let line: String = partial_line.drain(..=newline_pos).collect();
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                seq += 1;
                let record = LogRecord::new(seq, std::time::Instant::now(), self.descriptor.id.clone(), line);
                if tx.send(record).await.is_err() {
                    return;
                }
                last_partial_at = None;
            }

            if !partial_line.is_empty() {
                let now = tokio::time::Instant::now();
                let deadline = last_partial_at.get_or_insert(now);
                if now.duration_since(*deadline) >= crate::env::partial_line_timeout_ms() {
                    let line = std::mem::take(&mut partial_line);
                    seq += 1;
                    let record = LogRecord::new(seq, std::time::Instant::now(), self.descriptor.id.clone(), line);
                    if tx.send(record).await.is_err() {
                        return;
                    }
                    last_partial_at = None;
                }
            }
        }
    }
}

fn create_watcher(path: &std::path::Path, tx: mpsc::Sender<()>) -> Option<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
        if res.is_ok() {
            let _ = tx.try_send(());
        }
    })
    .ok()?;
    watcher.watch(path, RecursiveMode::NonRecursive).ok()?;
    Some(watcher)
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
