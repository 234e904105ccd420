// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Advisor stand-in for when no LLM is configured; always reports unavailable.

use super::{Advisor, AdvisorError, AdvisorResult, ContextRecord, Quota};
use async_trait::async_trait;

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpAdvisor;

impl NoOpAdvisor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Advisor for NoOpAdvisor {
    async fn classify(
        &self,
        _message: &str,
        _context: &[ContextRecord],
    ) -> Result<AdvisorResult, AdvisorError> {
        Err(AdvisorError::Transport("no advisor configured".into()))
    }

    async fn quota(&self) -> Quota {
        Quota::Exhausted
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
