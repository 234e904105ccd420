// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events produced by the classifier, anomaly detector, and progress tracker,
//! and consumed by the dispatcher (§3, §4.3, §4.5, §4.7).

use crate::id::SourceId;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Why an event was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// A configured source keyword matched the record.
    Keyword,
    /// A pattern-matcher entry matched.
    Pattern,
    /// Temporal anomaly detector: instantaneous rate exceeded threshold.
    Spike,
    /// Temporal anomaly detector: a previously-active source went silent.
    Stall,
    /// A source adapter's underlying resource disappeared (file deleted, unit stopped).
    StallSource,
    /// Structural novelty detector: an unseen fingerprint with an alarm signal.
    Novelty,
    /// Progress tracker: a milestone fraction was crossed.
    Progress,
    /// Progress tracker: a configured stage transitioned.
    Stage,
    /// Progress tracker: the monitored process completed.
    Completion,
    /// Profiler: drift ratio exceeded the re-profiling threshold.
    Drift,
    /// Record channel hit its high-water mark; oldest non-matching records were dropped.
    Backpressure,
}

/// A classified or anomaly-detected occurrence, ready for the dispatcher.
#[derive(Debug, Clone)]
pub struct Event {
    pub source_id: SourceId,
    pub seq: u64,
    pub arrival: Instant,
    pub severity: Severity,
    pub summary: String,
    pub reason: Reason,
    /// Extra detail for the notification body (e.g. rate/baseline for a spike,
    /// stage name for a stage transition). Not shown if empty.
    pub detail: Option<String>,
}

impl Event {
    pub fn new(
        source_id: SourceId,
        seq: u64,
        arrival: Instant,
        severity: Severity,
        summary: impl Into<String>,
        reason: Reason,
    ) -> Self {
        Self {
            source_id,
            seq,
            arrival,
            severity,
            summary: summary.into(),
            reason,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Key used by the dispatcher's debounce window: events that share this
    /// key within the debounce interval are coalesced (§4.7).
    pub fn debounce_key(&self) -> (Severity, Reason, String) {
        (self.severity, self.reason, self.summary.clone())
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
