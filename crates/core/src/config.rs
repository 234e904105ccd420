// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsed configuration tree (§6).
//!
//! Loaded once at startup from YAML and treated as immutable for the life
//! of the process; the daemon crate owns parsing the file off disk and
//! handing a [`Config`] to the engine.

use serde::{Deserialize, Serialize};

fn default_rate_limit_per_hour() -> u32 {
    10
}

fn default_debounce_seconds() -> u64 {
    300
}

fn default_severity_levels() -> Vec<String> {
    vec!["info".into(), "warning".into(), "critical".into()]
}

fn default_spike_threshold() -> f64 {
    3.0
}

fn default_stall_seconds() -> u64 {
    300
}

fn default_check_interval_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub provider: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    #[serde(default = "default_rate_limit_per_hour")]
    pub rate_limit_per_hour: u32,
    #[serde(default = "default_debounce_seconds")]
    pub debounce_seconds: u64,
    #[serde(default = "default_severity_levels")]
    pub severity_levels: Vec<String>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            rate_limit_per_hour: default_rate_limit_per_hour(),
            debounce_seconds: default_debounce_seconds(),
            severity_levels: default_severity_levels(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorType {
    File,
    Pid,
    Journal,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorConfig {
    #[serde(rename = "type")]
    pub kind: MonitorType,
    pub path: Option<String>,
    pub pid: Option<u32>,
    pub unit: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StageConfig {
    pub name: String,
    pub start_pattern: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProcessConfig {
    pub name: Option<String>,
    #[serde(default)]
    pub stages: Vec<StageConfig>,
    pub expected_duration_minutes: Option<f64>,
    /// Pattern marking the process as complete when matched against a raw
    /// line, independent of PID exit (§4.7: "terminal pattern matched, or
    /// PID exited 0").
    pub terminal_pattern: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnomalyConfig {
    #[serde(default = "default_spike_threshold")]
    pub spike_threshold: f64,
    #[serde(default = "default_stall_seconds")]
    pub stall_seconds: u64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            spike_threshold: default_spike_threshold(),
            stall_seconds: default_stall_seconds(),
        }
    }
}

/// Top-level configuration, one per daemon process.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub llm: Option<LlmConfig>,
    #[serde(default)]
    pub notification: NotificationConfig,
    pub monitors: Vec<MonitorConfig>,
    #[serde(default)]
    pub process: ProcessConfig,
    #[serde(default)]
    pub anomaly: AnomalyConfig,
    /// Disables profiler + anomaly detection; keeps patterns, keywords, progress.
    #[serde(default)]
    pub turbo: bool,
}

/// Errors surfaced while validating a freshly-parsed config; distinct from
/// the YAML syntax errors `serde_yaml` reports directly, so callers can
/// exit with the configuration-error code (2) for either case.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no monitors configured; at least one is required")]
    NoMonitors,
    #[error("monitor {index} is type `file` but has no `path`")]
    MissingPath { index: usize },
    #[error("monitor {index} is type `pid` but has no `pid`")]
    MissingPid { index: usize },
    #[error("monitor {index} is type `journal` but has no `unit`")]
    MissingUnit { index: usize },
}

impl Config {
    /// Validate cross-field constraints that serde's shape alone can't express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitors.is_empty() {
            return Err(ConfigError::NoMonitors);
        }
        for (index, monitor) in self.monitors.iter().enumerate() {
            match monitor.kind {
                MonitorType::File if monitor.path.is_none() => {
                    return Err(ConfigError::MissingPath { index });
                }
                MonitorType::Pid if monitor.pid.is_none() => {
                    return Err(ConfigError::MissingPid { index });
                }
                MonitorType::Journal if monitor.unit.is_none() => {
                    return Err(ConfigError::MissingUnit { index });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
