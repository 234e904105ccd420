// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::install_shutdown_signals;
use std::time::Duration;

#[tokio::test]
async fn sigterm_to_self_fires_the_shutdown_channel() {
    let mut rx = install_shutdown_signals().unwrap();

    let pid = std::process::id().to_string();
    std::process::Command::new("kill")
        .args(["-TERM", &pid])
        .status()
        .unwrap();

    let result = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
    assert!(result.is_ok(), "shutdown channel did not fire after SIGTERM");
}
