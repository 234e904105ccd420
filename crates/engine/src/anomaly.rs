// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Temporal (spike/stall) and structural (novelty) anomaly detection (§4.3).

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};
use telewatch_core::{Event, Fingerprint, Reason, Severity, SourceId};

use crate::profiler::contains_alarm_token;

/// Decay constant for the rate EWMA.
const RATE_TAU_SECS: f64 = 30.0;
/// Window over which the instantaneous rate is measured for spike detection.
const SPIKE_WINDOW_SECS: u64 = 5;
/// Spike events are suppressed for this long once emitted.
const SPIKE_SUPPRESS_SECS: u64 = 60;
/// A source must have produced at least this many records in the trailing
/// 10-minute window to be "active" enough for a stall to be meaningful.
const STALL_ELIGIBILITY_WINDOW_SECS: u64 = 600;
const STALL_ELIGIBILITY_MIN_RECORDS: usize = 10;
/// Bounded structural memory size (§4.3).
pub const DEFAULT_NOVELTY_CAPACITY: usize = 1000;

struct SourceAnomalyState {
    ewma_rate: f64,
    last_arrival: Option<Instant>,
    /// Arrival timestamps within the trailing 10 minutes, oldest first.
    recent_arrivals: VecDeque<Instant>,
    spike_suppressed_until: Option<Instant>,
    stall_emitted: bool,
    fingerprints: VecDeque<Fingerprint>,
    fingerprint_set: HashSet<Fingerprint>,
}

impl SourceAnomalyState {
    fn new() -> Self {
        Self {
            ewma_rate: 0.0,
            last_arrival: None,
            recent_arrivals: VecDeque::new(),
            spike_suppressed_until: None,
            stall_emitted: false,
            fingerprints: VecDeque::new(),
            fingerprint_set: HashSet::new(),
        }
    }

    fn prune_recent(&mut self, now: Instant) {
        let cutoff = Duration::from_secs(STALL_ELIGIBILITY_WINDOW_SECS);
        while let Some(&front) = self.recent_arrivals.front() {
            if now.saturating_duration_since(front) > cutoff {
                self.recent_arrivals.pop_front();
            } else {
                break;
            }
        }
    }

    fn instantaneous_rate(&self, now: Instant) -> f64 {
        let window = Duration::from_secs(SPIKE_WINDOW_SECS);
        let count = self
            .recent_arrivals
            .iter()
            .filter(|&&t| now.saturating_duration_since(t) <= window)
            .count();
        count as f64 / SPIKE_WINDOW_SECS as f64
    }

    fn was_active(&self) -> bool {
        self.recent_arrivals.len() >= STALL_ELIGIBILITY_MIN_RECORDS
    }
}

pub struct AnomalyConfig {
    pub spike_threshold: f64,
    pub stall_seconds: u64,
    pub novelty_capacity: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            spike_threshold: 3.0,
            stall_seconds: 300,
            novelty_capacity: DEFAULT_NOVELTY_CAPACITY,
        }
    }
}

/// Runs on the post-profile record stream, single task, no internal locking
/// (§5: "no parallelism within a stage").
pub struct AnomalyDetector {
    config: AnomalyConfig,
    sources: HashMap<SourceId, SourceAnomalyState>,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self {
            config,
            sources: HashMap::new(),
        }
    }

    /// Feed one record's arrival, updating temporal state and returning a
    /// spike event if the instantaneous rate just crossed the threshold.
    ///
    /// `baseline_rate` is the profiler's bootstrap-computed records/sec for
    /// this source; the spike threshold is checked against
    /// `max(ewma, baseline_rate)` so a cold EWMA at startup doesn't make the
    /// detector fire on ordinary traffic (§9 open question, resolved).
    pub fn observe_arrival(&mut self, source_id: &SourceId, baseline_rate: f64, now: Instant) -> Option<Event> {
        let state = self
            .sources
            .entry(source_id.clone())
            .or_insert_with(SourceAnomalyState::new);

        if let Some(last) = state.last_arrival {
            let dt = now.saturating_duration_since(last).as_secs_f64().max(0.001);
            let inst_rate = 1.0 / dt;
            let alpha = 1.0 - (-dt / RATE_TAU_SECS).exp();
            state.ewma_rate += alpha * (inst_rate - state.ewma_rate);
        }
        state.last_arrival = Some(now);
        state.recent_arrivals.push_back(now);
        state.prune_recent(now);
        state.stall_emitted = false;

        let threshold = self.config.spike_threshold * state.ewma_rate.max(baseline_rate);
        let rate = state.instantaneous_rate(now);

        let suppressed = state.spike_suppressed_until.map(|t| now < t).unwrap_or(false);
        if !suppressed && threshold > 0.0 && rate > threshold {
            state.spike_suppressed_until = Some(now + Duration::from_secs(SPIKE_SUPPRESS_SECS));
            return Some(
                Event::new(
                    source_id.clone(),
                    0,
                    now,
                    Severity::Warning,
                    "log rate spike".to_string(),
                    Reason::Spike,
                )
                .with_detail(format!("rate={:.2}/s baseline={:.2}/s", rate, baseline_rate)),
            );
        }
        None
    }

    /// Periodic sweep (independent of record arrival) that detects sources
    /// gone silent past `stall_seconds`, provided they were previously active.
    pub fn check_stalls(&mut self, now: Instant) -> Vec<Event> {
        let mut events = Vec::new();
        for (source_id, state) in self.sources.iter_mut() {
            state.prune_recent(now);
            let Some(last) = state.last_arrival else {
                continue;
            };
            let silent_for = now.saturating_duration_since(last);
            if silent_for.as_secs() >= self.config.stall_seconds
                && state.was_active()
                && !state.stall_emitted
            {
                state.stall_emitted = true;
                events.push(
                    Event::new(
                        source_id.clone(),
                        0,
                        now,
                        Severity::Critical,
                        "source went silent".to_string(),
                        Reason::Stall,
                    )
                    .with_detail(format!("silent for {}s", silent_for.as_secs())),
                );
            }
        }
        events
    }

    /// Structural novelty: absent fingerprint plus an alarm signal (§4.3).
    /// Inserts the fingerprint into structural memory regardless of outcome.
    pub fn observe_novelty(
        &mut self,
        source_id: &SourceId,
        fingerprint: &Fingerprint,
        extracted_severity: Option<&str>,
        raw_line: &str,
        source_keyword_match: bool,
    ) -> bool {
        let capacity = self.config.novelty_capacity;
        let state = self
            .sources
            .entry(source_id.clone())
            .or_insert_with(SourceAnomalyState::new);

        let absent = !state.fingerprint_set.contains(fingerprint);
        let alarm = extracted_severity
            .map(|s| matches!(s.to_ascii_uppercase().as_str(), "ERROR" | "FATAL" | "CRITICAL"))
            .unwrap_or(false)
            || source_keyword_match
            || contains_alarm_token(raw_line);

        if absent {
            state.fingerprint_set.insert(fingerprint.clone());
            state.fingerprints.push_back(fingerprint.clone());
            if state.fingerprints.len() > capacity {
                if let Some(oldest) = state.fingerprints.pop_front() {
                    state.fingerprint_set.remove(&oldest);
                }
            }
        }

        absent && alarm
    }
}

#[cfg(test)]
#[path = "anomaly_tests.rs"]
mod tests;
