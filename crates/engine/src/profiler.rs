// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Online format profiler (§4.2).
//!
//! Runs on every record from a source: during bootstrap (first 100 records
//! or first 60s, whichever comes first) it samples to classify format,
//! timestamp pattern, and level field; afterwards it maintains a drift
//! counter and triggers re-profiling when the locked format stops matching.

use regex::Regex;
use std::sync::OnceLock;
use std::time::Instant;
use telewatch_core::{
    profile::{BOOTSTRAP_SAMPLE_SIZE, BOOTSTRAP_WINDOW_SECS},
    ExtractedFields, LogFormat, Profile, Severity, TimestampPattern,
};

struct Lazy {
    pattern: &'static str,
    cell: OnceLock<Regex>,
}

impl Lazy {
    const fn new(pattern: &'static str) -> Self {
        Self {
            pattern,
            cell: OnceLock::new(),
        }
    }

    #[allow(clippy::expect_used)]
    fn get(&self) -> &Regex {
        self.cell
            .get_or_init(|| Regex::new(self.pattern).expect("timestamp pattern is valid regex"))
    }
}

/// Fixed library of timestamp patterns scanned during bootstrap (§4.2 step 2).
/// Order matters only for tie-breaking when a line matches more than one;
/// the most *frequent* match across the sample wins, not the first.
static TIMESTAMP_LIBRARY: [(&str, Lazy); 12] = [
    ("iso8601", Lazy::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?")),
    ("date_space_time", Lazy::new(r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}")),
    ("rfc3164", Lazy::new(r"[A-Z][a-z]{2}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2}")),
    ("bracketed_rfc3164", Lazy::new(r"\[[A-Z][a-z]{2}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2}\]")),
    ("bracketed_iso", Lazy::new(r"\[\d{4}-\d{2}-\d{2}[ T]\d{2}:\d{2}:\d{2}\]")),
    ("apache_clf", Lazy::new(r"\d{2}/[A-Za-z]{3}/\d{4}:\d{2}:\d{2}:\d{2}")),
    ("us_date", Lazy::new(r"\d{2}/\d{2}/\d{4} \d{2}:\d{2}:\d{2}")),
    ("dotted_date", Lazy::new(r"\d{4}\.\d{2}\.\d{2} \d{2}:\d{2}:\d{2}")),
    ("rfc2822", Lazy::new(r"[A-Z][a-z]{2}, \d{1,2} [A-Z][a-z]{2} \d{4} \d{2}:\d{2}:\d{2}")),
    ("epoch_millis", Lazy::new(r"\b\d{13}\b")),
    ("epoch_seconds", Lazy::new(r"\b\d{10}\b")),
    ("time_only", Lazy::new(r"^\d{2}:\d{2}:\d{2}")),
];


fn level_token_re() -> &'static Regex {
    static RE: Lazy = Lazy::new(r"(?i)^(DEBUG|INFO|WARN|WARNING|ERROR|FATAL|CRITICAL|TRACE)$");
    RE.get()
}

fn kv_re() -> &'static Regex {
    static RE: Lazy = Lazy::new(r"^(?:\S+=\S+)(?:\s+\S+=\S+)+");
    RE.get()
}

fn syslog_re() -> &'static Regex {
    static RE: Lazy = Lazy::new(r"^[A-Z][a-z]{2}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2}\s+\S+\s+\S+:\s");
    RE.get()
}

const DELIMITER_CANDIDATES: [char; 4] = [',', '|', ';', '\t'];

/// A single bootstrap sample, held until the window closes.
struct Sample {
    format: LogFormat,
    timestamp: Option<&'static str>,
    field_count: Option<(char, usize)>,
}

/// Per-source profiler state: wraps `telewatch_core::Profile` with the
/// compiled matchers and in-progress bootstrap sample set that core can't
/// hold (it only needs the stable, serializable result).
pub struct Profiler {
    profile: Profile,
    samples: Vec<Sample>,
    bootstrap_started_at: Option<Instant>,
}

/// Outcome of feeding one record through the profiler.
pub struct ProfileOutcome {
    pub fields: ExtractedFields,
    /// Set when this record's arrival triggered a re-profile.
    pub reprofiled: bool,
    /// Set when this record was observed during the bootstrap window, so
    /// downstream stages can suspend the source keyword filter for it (§4.2:
    /// "during bootstrap, the source keywords filter is not applied").
    pub bootstrapping: bool,
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Profiler {
    pub fn new() -> Self {
        Self {
            profile: Profile::new(),
            samples: Vec::with_capacity(BOOTSTRAP_SAMPLE_SIZE),
            bootstrap_started_at: None,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Feed one raw line through the profiler, returning the extracted
    /// fields and whether this arrival triggered a re-profile.
    pub fn observe(&mut self, raw_line: &str, now: Instant) -> ProfileOutcome {
        if !self.profile.is_bootstrapped() {
            self.bootstrap(raw_line, now);
            return ProfileOutcome {
                fields: self.extract(raw_line),
                reprofiled: false,
                bootstrapping: true,
            };
        }

        let fields = self.extract(raw_line);
        let matched = self.matches_locked_profile(raw_line, &fields);
        if matched {
            self.profile.record_match();
        } else {
            self.profile.record_mismatch();
        }
        self.profile.sample_count = self.profile.sample_count.saturating_add(1);

        let reprofiled = self.profile.should_reprofile();
        if reprofiled {
            self.profile.reset();
            self.samples.clear();
            self.bootstrap_started_at = None;
        }

        ProfileOutcome { fields, reprofiled, bootstrapping: false }
    }

    fn bootstrap(&mut self, raw_line: &str, now: Instant) {
        let started = *self.bootstrap_started_at.get_or_insert(now);
        let format = classify_format(raw_line);
        let timestamp = detect_timestamp(raw_line);
        let field_count = detect_delimiter(raw_line);
        self.samples.push(Sample {
            format,
            timestamp,
            field_count,
        });

        let window_elapsed = now.saturating_duration_since(started).as_secs() >= BOOTSTRAP_WINDOW_SECS;
        if self.samples.len() >= BOOTSTRAP_SAMPLE_SIZE || window_elapsed {
            self.lock_profile(now);
        }
    }

    fn lock_profile(&mut self, now: Instant) {
        let format = majority_format(&self.samples);
        let timestamp = majority_timestamp(&self.samples);
        let delimiter = majority_delimiter(&self.samples, format);

        let elapsed = self
            .bootstrap_started_at
            .map(|s| now.saturating_duration_since(s).as_secs_f64())
            .filter(|e| *e > 0.0)
            .unwrap_or(1.0);

        self.profile.format = Some(format);
        self.profile.timestamp_pattern = timestamp.map(TimestampPattern::new);
        self.profile.delimiter = delimiter;
        self.profile.level_field = matches!(format, LogFormat::Json).then(|| "level".to_string());
        self.profile.baseline_rate = self.samples.len() as f64 / elapsed;
        self.profile.drift_counter = 0;
        self.profile.sample_count = 0;
    }

    fn matches_locked_profile(&self, raw_line: &str, fields: &ExtractedFields) -> bool {
        let Some(format) = self.profile.format else {
            return true;
        };
        if classify_format(raw_line) != format {
            return false;
        }
        match &self.profile.timestamp_pattern {
            Some(pat) => fields.timestamp.is_some() || locate_timestamp(raw_line, pat.name).is_some(),
            None => true,
        }
    }

    fn extract(&self, raw_line: &str) -> ExtractedFields {
        let timestamp = self
            .profile
            .timestamp_pattern
            .as_ref()
            .and_then(|p| locate_timestamp(raw_line, p.name))
            .or_else(|| detect_timestamp(raw_line).and_then(|name| locate_timestamp(raw_line, name)));

        let level = extract_level(raw_line, classify_format(raw_line));

        let mut message = raw_line.to_string();
        if let Some(ts) = &timestamp {
            message = message.replacen(ts.as_str(), "", 1);
        }
        if let Some(lvl) = &level {
            message = message.replacen(lvl.as_str(), "", 1);
        }
        let message = message.trim().to_string();

        ExtractedFields {
            timestamp,
            level,
            message,
        }
    }
}

fn classify_format(line: &str) -> LogFormat {
    let trimmed = line.trim();
    if (trimmed.starts_with('{') && trimmed.ends_with('}'))
        && serde_json::from_str::<serde_json::Value>(trimmed)
            .map(|v| v.is_object())
            .unwrap_or(false)
    {
        return LogFormat::Json;
    }
    if syslog_re().is_match(trimmed) {
        return LogFormat::Syslog;
    }
    if kv_re().is_match(trimmed) {
        return LogFormat::Kv;
    }
    if detect_delimiter(trimmed).is_some() {
        return LogFormat::Csv;
    }
    LogFormat::Plain
}

/// A line is `csv` if it contains >=3 consistent fields for a recurring
/// delimiter (§4.2 step 1); returns the winning delimiter and field count.
fn detect_delimiter(line: &str) -> Option<(char, usize)> {
    DELIMITER_CANDIDATES
        .iter()
        .map(|&d| (d, line.matches(d).count() + 1))
        .filter(|&(_, count)| count >= 3)
        .max_by_key(|&(_, count)| count)
}

fn detect_timestamp(line: &str) -> Option<&'static str> {
    TIMESTAMP_LIBRARY
        .iter()
        .find(|(_, re)| re.get().is_match(line))
        .map(|(name, _)| *name)
}

fn locate_timestamp(line: &str, name: &str) -> Option<String> {
    TIMESTAMP_LIBRARY
        .iter()
        .find(|(n, _)| *n == name)
        .and_then(|(_, re)| re.get().find(line))
        .map(|m| m.as_str().to_string())
}

fn extract_level(line: &str, format: LogFormat) -> Option<String> {
    if format == LogFormat::Json {
        let value: serde_json::Value = serde_json::from_str(line.trim()).ok()?;
        for key in ["level", "severity", "lvl"] {
            if let Some(s) = value.get(key).and_then(|v| v.as_str()) {
                return Some(s.to_string());
            }
        }
        return None;
    }
    line.split_whitespace()
        .find(|tok| level_token_re().is_match(tok))
        .map(|s| s.to_string())
}

fn majority_format(samples: &[Sample]) -> LogFormat {
    count_majority(samples.iter().map(|s| s.format))
}

fn majority_timestamp(samples: &[Sample]) -> Option<&'static str> {
    let present: Vec<&'static str> = samples.iter().filter_map(|s| s.timestamp).collect();
    if present.is_empty() {
        return None;
    }
    Some(count_majority(present.into_iter()))
}

fn majority_delimiter(samples: &[Sample], format: LogFormat) -> Option<char> {
    if format != LogFormat::Csv {
        return None;
    }
    let present: Vec<char> = samples.iter().filter_map(|s| s.field_count).map(|(d, _)| d).collect();
    if present.is_empty() {
        return None;
    }
    Some(count_majority(present.into_iter()))
}

#[allow(clippy::expect_used)]
fn count_majority<T: Eq + std::hash::Hash + Copy>(items: impl Iterator<Item = T>) -> T {
    let mut counts: std::collections::HashMap<T, usize> = std::collections::HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(_, count)| count)
        .map(|(item, _)| item)
        .expect("count_majority called with at least one sample")
}

/// Severity implied directly by an extracted level token, independent of
/// pattern/advisor classification (used by the classifier's degraded path).
pub fn heuristic_severity(fields: &ExtractedFields, raw_line: &str) -> Option<Severity> {
    if let Some(level) = &fields.level {
        if let Some(sev) = Severity::from_level_token(level) {
            return Some(sev);
        }
    }
    if contains_alarm_token(raw_line) {
        return Some(Severity::Warning);
    }
    None
}

/// Stock alarm tokens scanned for novelty and degraded-path heuristics (§4.3, §4.5).
pub fn contains_alarm_token(line: &str) -> bool {
    static RE: Lazy = Lazy::new(r"Exception|Traceback|panic|segfault|OOM");
    RE.get().is_match(line)
}

#[cfg(test)]
#[path = "profiler_tests.rs"]
mod tests;
