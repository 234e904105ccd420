// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// File tailer fallback poll interval when the native watcher is unavailable (default: 250ms).
pub fn file_watcher_poll_ms() -> Duration {
    parse_duration_ms("TELEWATCH_WATCHER_POLL_MS").unwrap_or(Duration::from_millis(250))
}

/// Partial-line flush timeout: buffered EOF fragments are emitted anyway after this long.
pub fn partial_line_timeout_ms() -> Duration {
    parse_duration_ms("TELEWATCH_PARTIAL_LINE_TIMEOUT_MS").unwrap_or(Duration::from_secs(2))
}

/// Default PID watcher poll interval (default: 30s), overridden per-monitor by config.
pub fn pid_check_interval_secs() -> u64 {
    std::env::var("TELEWATCH_PID_CHECK_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(30)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
