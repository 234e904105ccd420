// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup (§10.2).
//!
//! Unlike the teacher's background daemon, this process runs in the
//! foreground under whatever supervises it (systemd, a shell, a CI job)
//! and doesn't manage its own log files — no `tracing-appender` rotation
//! here, just `fmt::layer()` to stderr.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a global subscriber: `RUST_LOG` if set, `info` otherwise.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
