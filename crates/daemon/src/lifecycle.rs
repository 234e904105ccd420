// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signal handling: bridges SIGTERM/SIGINT into the `broadcast` channel
//! `telewatch_engine::pipeline::run` races against (§5).

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::broadcast;
use tracing::info;

use crate::error::LifecycleError;

/// Install SIGTERM and SIGINT handlers and spawn a task that fires
/// `shutdown` the first time either arrives.
pub fn install_shutdown_signals() -> Result<broadcast::Receiver<()>, LifecycleError> {
    let mut sigterm = signal(SignalKind::terminate()).map_err(LifecycleError::SignalSetup)?;
    let mut sigint = signal(SignalKind::interrupt()).map_err(LifecycleError::SignalSetup)?;

    let (tx, rx) = broadcast::channel(1);
    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
            _ = sigint.recv() => info!("received SIGINT, shutting down"),
        }
        let _ = tx.send(());
    });

    Ok(rx)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
