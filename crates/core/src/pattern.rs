// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configured and runtime-injected patterns (§4.4).

use crate::severity::Severity;
use regex::Regex;

/// A single pattern-matcher rule.
///
/// Patterns are tested in list order; the first match wins. `enabled` lets
/// the advisor's generated patterns be disabled without removing them from
/// the list (useful once the cache already has entries keyed against them).
#[derive(Debug, Clone)]
pub struct Pattern {
    pub regex: Regex,
    pub severity: Severity,
    /// Template for the event summary; `{0}`, `{1}`, ... are replaced with the
    /// regex's capture groups, in order, when present.
    pub summary_template: String,
    pub enabled: bool,
}

impl Pattern {
    pub fn new(regex: Regex, severity: Severity, summary_template: impl Into<String>) -> Self {
        Self {
            regex,
            severity,
            summary_template: summary_template.into(),
            enabled: true,
        }
    }

    /// Test this pattern against `message`, returning a rendered summary on match.
    pub fn matches(&self, message: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let caps = self.regex.captures(message)?;
        let mut summary = self.summary_template.clone();
        for i in 1..caps.len() {
            if let Some(group) = caps.get(i) {
                summary = summary.replace(&format!("{{{}}}", i - 1), group.as_str());
            }
        }
        Some(summary)
    }
}

/// Outcome of a pattern match: severity plus rendered summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternHit {
    pub severity: Severity,
    pub summary: String,
}

/// Ordered list of patterns, configured plus runtime-injected.
///
/// Holds no locking of its own (§4.4/§4.8): the classifier owns a single
/// instance and serializes mutation the way it serializes cache mutation.
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    patterns: Vec<Pattern>,
}

impl PatternMatcher {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Self { patterns }
    }

    /// Test `message` against every enabled pattern in order; first match wins.
    pub fn first_match(&self, message: &str) -> Option<PatternHit> {
        self.patterns.iter().find_map(|p| {
            p.matches(message).map(|summary| PatternHit {
                severity: p.severity,
                summary,
            })
        })
    }

    /// Append an advisor-generated pattern (bootstrap teaching, §4.5).
    pub fn inject(&mut self, pattern: Pattern) {
        self.patterns.push(pattern);
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
