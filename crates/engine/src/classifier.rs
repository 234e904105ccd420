// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Classifier: the pipeline's decision core (§4.5).
//!
//! Owns the analysis cache and pattern list — the single mutual-exclusion
//! boundary the concurrency model calls for (§5) — plus the advisor call
//! budget and per-source context window used for stack-trace capture.

use regex::Regex;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use telewatch_adapters::advisor::{Advisor, ContextRecord, Quota};
use telewatch_core::{
    fingerprint, ClassificationSource, Event, Fingerprint, LogRecord, Pattern, PatternMatcher, Reason, Severity,
    SourceId,
};

use crate::cache::AnalysisCache;
use crate::profiler::heuristic_severity;

/// Default soft cap on advisor calls per trailing hour (§4.5).
pub const DEFAULT_ADVISOR_BUDGET_PER_HOUR: u32 = 60;
/// Records of prior context kept per source for stack-trace capture (§4.5).
const CONTEXT_WINDOW_SIZE: usize = 5;
const QUOTA_THROTTLE_SECS: u64 = 60;
const QUOTA_EXHAUSTED_SECS: u64 = 24 * 60 * 60;

pub struct ClassifierConfig {
    pub advisor_budget_per_hour: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            advisor_budget_per_hour: DEFAULT_ADVISOR_BUDGET_PER_HOUR,
        }
    }
}

pub struct Classifier<A: Advisor> {
    cache: AnalysisCache,
    patterns: PatternMatcher,
    advisor: Option<A>,
    budget_per_hour: u32,
    call_log: VecDeque<Instant>,
    degraded_until: Option<Instant>,
    exhausted_until: Option<Instant>,
    context: HashMap<SourceId, VecDeque<ContextRecord>>,
}

impl<A: Advisor> Classifier<A> {
    pub fn new(cache: AnalysisCache, advisor: Option<A>, config: ClassifierConfig) -> Self {
        Self {
            cache,
            patterns: PatternMatcher::default(),
            advisor,
            budget_per_hour: config.advisor_budget_per_hour,
            call_log: VecDeque::new(),
            degraded_until: None,
            exhausted_until: None,
            context: HashMap::new(),
        }
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Decide severity and summary for a record that reached the classifier
    /// because a source keyword matched, a pattern matched, or the anomaly
    /// detector emitted a novelty signal. `reason` must not be `Spike` or
    /// `Stall` — those are owned entirely by the anomaly detector.
    pub async fn decide(&mut self, record: &LogRecord, reason: Reason, now: Instant) -> Event {
        debug_assert!(!matches!(reason, Reason::Spike | Reason::Stall));

        let message = record.message_portion();
        let fp = fingerprint(message);
        self.push_context(record);

        if let Some((severity, summary)) = self.cache.get(&fp, now) {
            tracing::debug!(source = %record.source_id, %fp, "classifier cache hit");
            return Event::new(record.source_id.clone(), record.seq, record.arrival, severity, summary, reason);
        }

        if let Some(hit) = self.patterns.first_match(message) {
            self.cache.insert(
                fp,
                hit.severity,
                hit.summary.clone(),
                now,
                ClassificationSource::Local,
            );
            return Event::new(
                record.source_id.clone(),
                record.seq,
                record.arrival,
                hit.severity,
                hit.summary,
                Reason::Pattern,
            );
        }

        if self.advisor_available(now) && self.within_budget(now) {
            if let Some(advisor) = self.advisor.clone() {
                let context: Vec<ContextRecord> = self
                    .context
                    .get(&record.source_id)
                    .map(|q| q.iter().cloned().collect())
                    .unwrap_or_default();
                self.call_log.push_back(now);
                match advisor.classify(message, &context).await {
                    Ok(result) => {
                        if result.severity >= Severity::Warning {
                            self.cache.insert(
                                fp.clone(),
                                result.severity,
                                result.summary.clone(),
                                now,
                                ClassificationSource::Advisor,
                            );
                        }
                        if let Some(pattern_src) = &result.generated_pattern {
                            self.inject_pattern(pattern_src, result.severity);
                        }
                        return Event::new(
                            record.source_id.clone(),
                            record.seq,
                            record.arrival,
                            result.severity,
                            result.summary,
                            reason,
                        );
                    }
                    Err(e) => {
                        tracing::warn!(source = %record.source_id, error = %e, "advisor call failed, degrading");
                    }
                }
            }
        }

        self.degraded_decision(record, &fp, reason, now)
    }

    fn degraded_decision(&self, record: &LogRecord, fp: &Fingerprint, reason: Reason, now: Instant) -> Event {
        let fields = record.fields.clone().unwrap_or_default();
        let severity = heuristic_severity(&fields, &record.raw_line).unwrap_or(Severity::Info);
        let summary: String = message_excerpt(record.message_portion());
        self.cache
            .insert(fp.clone(), severity, summary.clone(), now, ClassificationSource::Local);
        Event::new(record.source_id.clone(), record.seq, record.arrival, severity, summary, reason)
    }

    fn inject_pattern(&mut self, pattern_src: &str, severity: Severity) {
        match Regex::new(pattern_src) {
            Ok(regex) => {
                self.patterns.inject(Pattern::new(regex, severity, "{0}"));
                tracing::info!(pattern = pattern_src, "injected advisor-generated pattern");
            }
            Err(e) => {
                tracing::warn!(pattern = pattern_src, error = %e, "advisor returned an invalid pattern, ignoring");
            }
        }
    }

    fn push_context(&mut self, record: &LogRecord) {
        let queue = self.context.entry(record.source_id.clone()).or_default();
        queue.push_back(ContextRecord {
            raw_line: record.raw_line.clone(),
        });
        while queue.len() > CONTEXT_WINDOW_SIZE {
            queue.pop_front();
        }
    }

    fn advisor_available(&self, now: Instant) -> bool {
        if self.advisor.is_none() {
            return false;
        }
        if self.exhausted_until.map(|t| now < t).unwrap_or(false) {
            return false;
        }
        if self.degraded_until.map(|t| now < t).unwrap_or(false) {
            return false;
        }
        true
    }

    fn within_budget(&mut self, now: Instant) -> bool {
        let cutoff = Duration::from_secs(60 * 60);
        while let Some(&front) = self.call_log.front() {
            if now.saturating_duration_since(front) > cutoff {
                self.call_log.pop_front();
            } else {
                break;
            }
        }
        (self.call_log.len() as u32) < self.budget_per_hour
    }

    /// Poll and apply the advisor's quota state, called once per tick by the
    /// pipeline so degradation windows are honored even between classify calls.
    pub async fn refresh_quota(&mut self, now: Instant) {
        let Some(advisor) = self.advisor.clone() else {
            return;
        };
        match advisor.quota().await {
            Quota::Ok => {}
            Quota::Throttled => {
                self.degraded_until = Some(now + Duration::from_secs(QUOTA_THROTTLE_SECS));
            }
            Quota::Exhausted => {
                self.exhausted_until = Some(now + Duration::from_secs(QUOTA_EXHAUSTED_SECS));
            }
        }
    }
}

fn message_excerpt(message: &str) -> String {
    const MAX_LEN: usize = 280;
    if message.chars().count() <= MAX_LEN {
        message.to_string()
    } else {
        message.chars().take(MAX_LEN).collect()
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
