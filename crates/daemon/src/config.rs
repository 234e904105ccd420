// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loads and validates the YAML config file (§6) into `telewatch_core::Config`.

use std::path::Path;

use telewatch_core::Config;

use crate::error::LifecycleError;

/// Read `path`, parse it as YAML, and run the cross-field validation that
/// serde's shape alone can't express. Any failure here is a configuration
/// error (exit code 2, per §6).
pub fn load(path: &Path) -> Result<Config, LifecycleError> {
    let raw = std::fs::read_to_string(path)?;
    let config: Config = serde_yaml::from_str(&raw)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
