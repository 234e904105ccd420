// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;
use telewatch_core::{SourceId, SourceKind};

fn descriptor(id: &str, keywords: &[&str]) -> SourceDescriptor {
    SourceDescriptor {
        id: SourceId::new(id),
        kind: SourceKind::File,
        location: String::new(),
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
        display_name: id.into(),
    }
}

#[tokio::test]
async fn tails_appended_lines() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "first line").unwrap();
    file.flush().unwrap();

    let tailer = Box::new(FileTailer::new(
        descriptor("app", &[]),
        file.path().to_path_buf(),
        true,
    ));
    let (tx, mut rx) = mpsc::channel(16);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = tokio::spawn(tailer.run(tx, shutdown_rx));

    let record = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for record")
        .expect("channel closed");
    assert_eq!(record.raw_line, "first line");

    let _ = shutdown_tx.send(());
    let _ = tokio::time::timeout(std::time::Duration::from_secs(2), handle).await;
}

/// The keyword filter is applied downstream in the pipeline, once the
/// profiler's bootstrap state is visible (§4.1, §4.2) — the adapter itself
/// must hand up every line, matching or not, so the profiler sees
/// representative traffic and the engine can decide when to drop.
#[tokio::test]
async fn emits_lines_regardless_of_the_source_keyword_filter() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let tailer = Box::new(FileTailer::new(
        descriptor("app", &["timeout"]),
        file.path().to_path_buf(),
        false,
    ));
    let (tx, mut rx) = mpsc::channel(16);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = tokio::spawn(tailer.run(tx, shutdown_rx));

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    writeln!(file, "all is well").unwrap();
    writeln!(file, "connection timeout detected").unwrap();
    file.flush().unwrap();

    let first = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for record")
        .expect("channel closed");
    assert_eq!(first.raw_line, "all is well");

    let second = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for record")
        .expect("channel closed");
    assert_eq!(second.raw_line, "connection timeout detected");

    let _ = shutdown_tx.send(());
    let _ = tokio::time::timeout(std::time::Duration::from_secs(2), handle).await;
}

#[test]
fn unix_inode_changes_when_file_is_replaced() {
    let first = tempfile::NamedTempFile::new().unwrap();
    let second = tempfile::NamedTempFile::new().unwrap();
    let inode_a = file_inode(&first.as_file().metadata().unwrap());
    let inode_b = file_inode(&second.as_file().metadata().unwrap());
    if cfg!(unix) {
        assert_ne!(inode_a, inode_b);
    }
}
