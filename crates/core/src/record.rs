// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source descriptors and the raw log records they produce.

use crate::id::SourceId;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Maximum length of a raw line retained on a [`LogRecord`]; longer lines are truncated
/// before they enter the pipeline so a pathological line can't blow up downstream buffers.
pub const MAX_RAW_LINE_LEN: usize = 8192;

/// Kind of observable a source adapter watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    File,
    Pid,
    Journal,
}

/// Static description of a configured log source.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    pub id: SourceId,
    pub kind: SourceKind,
    /// Path, PID, or systemd unit name, depending on `kind`.
    pub location: String,
    /// Case-insensitive substring filter; empty means "no filter".
    pub keywords: Vec<String>,
    pub display_name: String,
}

impl SourceDescriptor {
    /// Whether `line` passes this source's keyword filter.
    ///
    /// An empty filter always passes. Matching is case-insensitive substring
    /// containment, applied per §4.1.
    pub fn passes_keyword_filter(&self, line: &str) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let lower = line.to_ascii_lowercase();
        self.keywords
            .iter()
            .any(|k| lower.contains(&k.to_ascii_lowercase()))
    }
}

/// Fields extracted from a record by the profiler, once a format is locked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    /// Timestamp text as found in the line (unparsed; callers compare/parse as needed).
    pub timestamp: Option<String>,
    /// Level token (`ERROR`, `WARN`, ...) or JSON `level`/`severity`/`lvl` value.
    pub level: Option<String>,
    /// Message portion, i.e. the line with timestamp/level prefix stripped.
    pub message: String,
}

/// A single line of text read from a source, with provenance.
///
/// Immutable once created; `seq` is strictly increasing within a source
/// (the per-source-ordering invariant in §3).
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub seq: u64,
    pub arrival: Instant,
    pub source_id: SourceId,
    pub raw_line: String,
    pub fields: Option<ExtractedFields>,
}

impl LogRecord {
    pub fn new(seq: u64, arrival: Instant, source_id: SourceId, raw_line: String) -> Self {
        let raw_line = if raw_line.len() > MAX_RAW_LINE_LEN {
            raw_line.chars().take(MAX_RAW_LINE_LEN).collect()
        } else {
            raw_line
        };
        Self {
            seq,
            arrival,
            source_id,
            raw_line,
            fields: None,
        }
    }

    /// The message portion to hand to the fingerprinter and classifier:
    /// the profiler-extracted message if available, else the raw line.
    pub fn message_portion(&self) -> &str {
        match &self.fields {
            Some(f) => &f.message,
            None => &self.raw_line,
        }
    }

    /// The extracted level string, if the profiler identified one.
    pub fn level(&self) -> Option<&str> {
        self.fields.as_ref().and_then(|f| f.level.as_deref())
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
