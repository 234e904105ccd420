// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP-backed advisor, provider-agnostic behind a chat-completion-style endpoint.
//!
//! Any provider reachable via a JSON POST that echoes a JSON result can sit
//! behind this adapter (§4.6: "No specific provider is part of the spec").

use super::{Advisor, AdvisorError, AdvisorResult, ContextRecord, Quota};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use telewatch_core::Severity;

const CLASSIFY_DEADLINE: Duration = Duration::from_secs(10);
const THROTTLE_BACKOFF: Duration = Duration::from_secs(60);
const DEFAULT_PER_HOUR_BUDGET: u32 = 60;

/// The explicit result shape the advisor's JSON body is validated against
/// before use, per the "dynamic typing" redesign flag (§9): a schema
/// violation degrades the classifier exactly like a transport error.
#[derive(Debug, Deserialize)]
struct RawAdvisorResponse {
    severity: String,
    summary: String,
    generated_pattern: Option<String>,
}

fn parse_severity(s: &str) -> Option<Severity> {
    match s.to_ascii_lowercase().as_str() {
        "info" => Some(Severity::Info),
        "warning" => Some(Severity::Warning),
        "critical" => Some(Severity::Critical),
        _ => None,
    }
}

struct QuotaState {
    throttled_until: Option<Instant>,
    exhausted_until: Option<Instant>,
}

#[derive(Clone)]
pub struct HttpAdvisor {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    quota: Arc<Mutex<QuotaState>>,
}

impl HttpAdvisor {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            quota: Arc::new(Mutex::new(QuotaState {
                throttled_until: None,
                exhausted_until: None,
            })),
        }
    }

    fn mark_throttled(&self) {
        self.quota.lock().throttled_until = Some(Instant::now() + THROTTLE_BACKOFF);
    }

    fn mark_exhausted(&self) {
        self.quota.lock().exhausted_until = Some(Instant::now() + Duration::from_secs(24 * 3600));
    }

    async fn classify_inner(
        &self,
        message: &str,
        context: &[ContextRecord],
    ) -> Result<AdvisorResult, AdvisorError> {
        let context_lines: Vec<&str> = context.iter().map(|c| c.raw_line.as_str()).collect();
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "message": message,
                "context": context_lines,
            }))
            .send()
            .await
            .map_err(|e| AdvisorError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            self.mark_throttled();
            return Err(AdvisorError::Transport("rate limited (429)".into()));
        }
        if status.as_u16() == 402 {
            self.mark_exhausted();
            return Err(AdvisorError::Transport("quota exhausted (402)".into()));
        }
        if status.is_server_error() {
            return Err(AdvisorError::Transport(format!("server error {status}")));
        }
        if !status.is_success() {
            return Err(AdvisorError::Transport(format!("unexpected status {status}")));
        }

        let raw: RawAdvisorResponse = response
            .json()
            .await
            .map_err(|e| AdvisorError::SchemaViolation(e.to_string()))?;

        let severity = parse_severity(&raw.severity)
            .ok_or_else(|| AdvisorError::SchemaViolation(format!("unknown severity `{}`", raw.severity)))?;

        let mut summary = raw.summary;
        if summary.chars().count() > AdvisorResult::MAX_SUMMARY_LEN {
            summary = summary.chars().take(AdvisorResult::MAX_SUMMARY_LEN).collect();
        }

        Ok(AdvisorResult {
            severity,
            summary,
            generated_pattern: raw.generated_pattern,
        })
    }
}

#[async_trait]
impl Advisor for HttpAdvisor {
    async fn classify(
        &self,
        message: &str,
        context: &[ContextRecord],
    ) -> Result<AdvisorResult, AdvisorError> {
        match tokio::time::timeout(CLASSIFY_DEADLINE, self.classify_inner(message, context)).await {
            Ok(result) => result,
            Err(_) => Err(AdvisorError::Timeout),
        }
    }

    async fn quota(&self) -> Quota {
        let now = Instant::now();
        let mut state = self.quota.lock();
        if let Some(until) = state.exhausted_until {
            if now < until {
                return Quota::Exhausted;
            }
            state.exhausted_until = None;
        }
        if let Some(until) = state.throttled_until {
            if now < until {
                return Quota::Throttled;
            }
            state.throttled_until = None;
        }
        Quota::Ok
    }
}

/// Per-hour soft cap on advisor calls (§4.5, default 60).
pub fn default_per_hour_budget() -> u32 {
    DEFAULT_PER_HOUR_BUDGET
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
