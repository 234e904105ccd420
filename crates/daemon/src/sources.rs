// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the configured source adapters (§4.1) from `config.monitors`.

use std::path::PathBuf;
use std::time::Duration;

use telewatch_adapters::source::{FileTailer, JournalReader, PidWatcher, SourceAdapter};
use telewatch_core::config::{ConfigError, MonitorConfig, MonitorType};
use telewatch_core::{SourceDescriptor, SourceId, SourceKind};

/// Build one adapter per configured monitor, in config order. Each gets a
/// stable id derived from its position so `/status` and log lines can refer
/// to a source consistently across a run.
///
/// Returns the same [`ConfigError`] variants `Config::validate` already
/// checks for; `config::load` calls `validate` first, so in the daemon's
/// own startup path this can't actually fire, but `build` doesn't assume
/// that — a caller that skips validation gets a real error, not a panic.
pub fn build(monitors: &[MonitorConfig]) -> Result<Vec<Box<dyn SourceAdapter>>, ConfigError> {
    monitors.iter().enumerate().map(|(index, monitor)| build_one(index, monitor)).collect()
}

fn build_one(index: usize, monitor: &MonitorConfig) -> Result<Box<dyn SourceAdapter>, ConfigError> {
    match monitor.kind {
        MonitorType::File => {
            let path = monitor.path.clone().ok_or(ConfigError::MissingPath { index })?;
            let descriptor = descriptor(index, SourceKind::File, &path, monitor);
            Ok(Box::new(FileTailer::new(descriptor, PathBuf::from(path), false)))
        }
        MonitorType::Pid => {
            let pid = monitor.pid.ok_or(ConfigError::MissingPid { index })?;
            let descriptor = descriptor(index, SourceKind::Pid, &pid.to_string(), monitor);
            let check_interval = Duration::from_secs(monitor.check_interval_secs);
            Ok(Box::new(PidWatcher::new(descriptor, pid, check_interval, None)))
        }
        MonitorType::Journal => {
            let unit = monitor.unit.clone().ok_or(ConfigError::MissingUnit { index })?;
            let descriptor = descriptor(index, SourceKind::Journal, &unit, monitor);
            Ok(Box::new(JournalReader::new(descriptor, unit)))
        }
    }
}

fn descriptor(index: usize, kind: SourceKind, location: &str, monitor: &MonitorConfig) -> SourceDescriptor {
    SourceDescriptor {
        id: SourceId::new(format!("source-{index}")),
        kind,
        location: location.to_string(),
        keywords: monitor.keywords.clone(),
        display_name: location.to_string(),
    }
}

#[cfg(test)]
#[path = "sources_tests.rs"]
mod tests;
