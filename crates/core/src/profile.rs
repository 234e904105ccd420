// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-source format profile (§4.2).

use serde::{Deserialize, Serialize};

/// Majority-rule log format classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    Csv,
    Syslog,
    Kv,
    Plain,
}

/// A locked timestamp pattern, identified by name against the profiler's
/// fixed library (ISO 8601, RFC 3164, epoch seconds, ...). The engine crate
/// owns the compiled matchers; core only needs a stable name to round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampPattern {
    pub name: &'static str,
}

impl TimestampPattern {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

/// Number of records (or seconds, whichever comes first) sampled during bootstrap.
pub const BOOTSTRAP_SAMPLE_SIZE: usize = 100;
pub const BOOTSTRAP_WINDOW_SECS: u64 = 60;

/// Trailing window size over which drift ratio is computed.
pub const DRIFT_WINDOW: usize = 100;
/// Drift ratio above which the profiler re-enters bootstrap.
pub const DRIFT_THRESHOLD: f64 = 0.20;

/// Per-source profile state, built during bootstrap and mutated online.
#[derive(Debug, Clone)]
pub struct Profile {
    pub format: Option<LogFormat>,
    pub delimiter: Option<char>,
    pub timestamp_pattern: Option<TimestampPattern>,
    /// Position of the level field: a column index for csv/kv, or none for
    /// formats where the level is detected by regex scan.
    pub level_field: Option<String>,
    /// Baseline rate in records/sec, computed over the bootstrap window.
    pub baseline_rate: f64,
    /// Increments on mismatch, decrements (floor 0) on match; reset on re-profile.
    pub drift_counter: u32,
    pub sample_count: usize,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            format: None,
            delimiter: None,
            timestamp_pattern: None,
            level_field: None,
            baseline_rate: 0.0,
            drift_counter: 0,
            sample_count: 0,
        }
    }
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether bootstrap has locked a format (and so is considered complete).
    pub fn is_bootstrapped(&self) -> bool {
        self.format.is_some()
    }

    /// Record a drift-counter match (decrement, floor zero).
    pub fn record_match(&mut self) {
        self.drift_counter = self.drift_counter.saturating_sub(1);
    }

    /// Record a drift-counter mismatch (increment).
    pub fn record_mismatch(&mut self) {
        self.drift_counter += 1;
    }

    /// Whether the drift ratio over the trailing window exceeds the
    /// re-profiling threshold.
    pub fn should_reprofile(&self) -> bool {
        self.sample_count >= DRIFT_WINDOW
            && (self.drift_counter as f64 / DRIFT_WINDOW as f64) > DRIFT_THRESHOLD
    }

    /// Reset to an unprofiled state, preserving nothing, ready to re-bootstrap.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
