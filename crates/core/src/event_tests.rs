// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::id::SourceId;

fn source() -> SourceId {
    SourceId::new("app")
}

#[test]
fn debounce_key_groups_identical_severity_reason_summary() {
    let a = Event::new(source(), 1, Instant::now(), Severity::Warning, "db down", Reason::Pattern);
    let b = Event::new(source(), 2, Instant::now(), Severity::Warning, "db down", Reason::Pattern);
    assert_eq!(a.debounce_key(), b.debounce_key());
}

#[test]
fn debounce_key_differs_on_summary() {
    let a = Event::new(source(), 1, Instant::now(), Severity::Warning, "db down", Reason::Pattern);
    let b = Event::new(source(), 2, Instant::now(), Severity::Warning, "cache down", Reason::Pattern);
    assert_ne!(a.debounce_key(), b.debounce_key());
}

#[test]
fn with_detail_attaches_optional_context() {
    let event = Event::new(source(), 1, Instant::now(), Severity::Warning, "spike", Reason::Spike)
        .with_detail("rate=12.0 baseline=3.0");
    assert_eq!(event.detail.as_deref(), Some("rate=12.0 baseline=3.0"));
}

#[test]
fn fresh_event_has_no_detail() {
    let event = Event::new(source(), 1, Instant::now(), Severity::Info, "ok", Reason::Keyword);
    assert!(event.detail.is_none());
}

#[yare::parameterized(
    keyword = { Reason::Keyword, "keyword" },
    pattern = { Reason::Pattern, "pattern" },
    spike = { Reason::Spike, "spike" },
    stall = { Reason::Stall, "stall" },
    stall_source = { Reason::StallSource, "stall_source" },
    novelty = { Reason::Novelty, "novelty" },
    progress = { Reason::Progress, "progress" },
    stage = { Reason::Stage, "stage" },
    completion = { Reason::Completion, "completion" },
    drift = { Reason::Drift, "drift" },
    backpressure = { Reason::Backpressure, "backpressure" },
)]
fn reason_serializes_as_snake_case(reason: Reason, expected: &str) {
    assert_eq!(
        serde_json::to_string(&reason).unwrap(),
        format!("\"{}\"", expected)
    );
}
