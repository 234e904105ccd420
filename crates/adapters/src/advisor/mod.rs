// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External LLM advisor boundary (§4.6).

mod http;
mod noop;

pub use http::HttpAdvisor;
pub use noop::NoOpAdvisor;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeAdvisor;

use async_trait::async_trait;
use telewatch_core::Severity;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("advisor call timed out")]
    Timeout,
    #[error("advisor transport error: {0}")]
    Transport(String),
    #[error("advisor response failed schema validation: {0}")]
    SchemaViolation(String),
}

/// One prior record from the same source, supplied for stack-trace capture (§4.5).
#[derive(Debug, Clone)]
pub struct ContextRecord {
    pub raw_line: String,
}

/// Remaining advisor call budget, per §4.6's `quota()` contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    Ok,
    /// Degrade for 60s, then retry.
    Throttled,
    /// Unavailable for the rest of the calendar day.
    Exhausted,
}

/// Parsed advisor classification result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorResult {
    pub severity: Severity,
    /// Truncated to at most 280 characters per the wire contract.
    pub summary: String,
    /// An optional pattern (regex source text) the advisor suggests for future matches
    /// of this shape, used for bootstrap teaching (§4.5).
    pub generated_pattern: Option<String>,
}

impl AdvisorResult {
    pub const MAX_SUMMARY_LEN: usize = 280;
}

/// External LLM collaborator that turns a record plus context into a classification.
#[async_trait]
pub trait Advisor: Clone + Send + Sync + 'static {
    /// Classify a record, bounded by a 10s deadline (§4.6). Implementations
    /// must themselves enforce the deadline and return [`AdvisorError::Timeout`]
    /// rather than let a caller race a timer against an unbounded call.
    async fn classify(
        &self,
        message: &str,
        context: &[ContextRecord],
    ) -> Result<AdvisorResult, AdvisorError>;

    /// Current quota state; `throttled`/`exhausted` drive classifier degradation.
    async fn quota(&self) -> Quota;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
