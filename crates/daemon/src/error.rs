// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level daemon error, mapped to the process exit codes in §6.

use telewatch_core::config::ConfigError;
use telewatch_engine::EngineError;
use thiserror::Error;

/// Errors that can reach `main`, each carrying the exit code §6 assigns it.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to read config file: {0}")]
    ConfigRead(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    ConfigInvalid(#[from] ConfigError),

    #[error("failed to install signal handler: {0}")]
    SignalSetup(std::io::Error),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] EngineError),
}

impl LifecycleError {
    /// Process exit code per §6: 2 for configuration errors, 3 for anything
    /// that only shows up once the pipeline is actually running.
    pub fn exit_code(&self) -> i32 {
        match self {
            LifecycleError::ConfigRead(_) | LifecycleError::ConfigParse(_) | LifecycleError::ConfigInvalid(_) => 2,
            LifecycleError::SignalSetup(_) | LifecycleError::Pipeline(_) => 3,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
