// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn descriptor(keywords: &[&str]) -> SourceDescriptor {
    SourceDescriptor {
        id: SourceId::new("app"),
        kind: SourceKind::File,
        location: "/var/log/app.log".into(),
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
        display_name: "app".into(),
    }
}

#[test]
fn empty_keyword_filter_passes_everything() {
    let d = descriptor(&[]);
    assert!(d.passes_keyword_filter("anything at all"));
}

#[test]
fn keyword_filter_is_case_insensitive_substring() {
    let d = descriptor(&["timeout", "OOM"]);
    assert!(d.passes_keyword_filter("connection TIMEOUT after 30s"));
    assert!(d.passes_keyword_filter("process killed: oom"));
    assert!(!d.passes_keyword_filter("all good here"));
}

#[test]
fn raw_line_is_truncated_to_max_len() {
    let long_line = "x".repeat(MAX_RAW_LINE_LEN + 500);
    let record = LogRecord::new(1, Instant::now(), SourceId::new("app"), long_line);
    assert_eq!(record.raw_line.len(), MAX_RAW_LINE_LEN);
}

#[test]
fn message_portion_falls_back_to_raw_line_without_profile() {
    let record = LogRecord::new(1, Instant::now(), SourceId::new("app"), "hello".into());
    assert_eq!(record.message_portion(), "hello");
    assert_eq!(record.level(), None);
}

#[test]
fn message_portion_uses_extracted_fields_when_present() {
    let mut record = LogRecord::new(1, Instant::now(), SourceId::new("app"), "raw".into());
    record.fields = Some(ExtractedFields {
        timestamp: Some("2024-01-01T00:00:00Z".into()),
        level: Some("ERROR".into()),
        message: "failed to connect".into(),
    });
    assert_eq!(record.message_portion(), "failed to connect");
    assert_eq!(record.level(), Some("ERROR"));
}
