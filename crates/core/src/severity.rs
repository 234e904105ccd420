// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event severity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a classified event.
///
/// Ordered `Info < Warning < Critical` so the dispatcher can compare
/// severities directly (e.g. "at least warning").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl Severity {
    /// Parse a level token extracted from a log line (`ERROR`, `WARN`, ...) into a severity.
    ///
    /// Returns `None` for tokens that don't map to a severity (e.g. `DEBUG`, `TRACE`),
    /// matching the profiler's level-field detection in §4.2.
    pub fn from_level_token(token: &str) -> Option<Severity> {
        match token.to_ascii_uppercase().as_str() {
            "FATAL" | "CRITICAL" => Some(Severity::Critical),
            "ERROR" => Some(Severity::Warning),
            "WARN" | "WARNING" => Some(Severity::Warning),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "severity_tests.rs"]
mod tests;
