// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn returns_queued_results_in_order_and_counts_calls() {
    let advisor = FakeAdvisor::new();
    advisor.push_result(Ok(AdvisorResult {
        severity: Severity::Warning,
        summary: "db down".into(),
        generated_pattern: None,
    }));
    advisor.push_result(Err(AdvisorError::Timeout));

    let first = advisor.classify("db down", &[]).await.unwrap();
    assert_eq!(first.severity, Severity::Warning);
    assert!(advisor.classify("anything", &[]).await.is_err());
    assert_eq!(advisor.call_count(), 2);
}

#[tokio::test]
async fn defaults_to_error_when_queue_is_empty() {
    let advisor = FakeAdvisor::new();
    assert!(advisor.classify("x", &[]).await.is_err());
}

#[tokio::test]
async fn quota_is_settable() {
    let advisor = FakeAdvisor::new();
    assert_eq!(advisor.quota().await, Quota::Ok);
    advisor.set_quota(Quota::Exhausted);
    assert_eq!(advisor.quota().await, Quota::Exhausted);
}
