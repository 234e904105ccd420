// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Selects the advisor implementation `pipeline::run` gets monomorphized
//! over, since that function takes a single concrete `Advisor` type rather
//! than a trait object (§4.6).

use async_trait::async_trait;
use telewatch_adapters::advisor::{Advisor, AdvisorError, AdvisorResult, ContextRecord, HttpAdvisor, NoOpAdvisor, Quota};
use telewatch_core::config::LlmConfig;

/// Either a live HTTP-backed advisor or a stand-in that always reports
/// itself unavailable, chosen once at startup from `config.llm`.
#[derive(Clone)]
pub enum ConfiguredAdvisor {
    Http(HttpAdvisor),
    Disabled(NoOpAdvisor),
}

/// Build the advisor for this run. `llm.provider` is treated as the
/// endpoint URL directly: the config schema has no separate `endpoint`
/// field, and a provider string that is itself a reachable URL is the
/// simplest reading of "no specific provider is part of the spec" (§4.6).
pub fn build(llm: Option<&LlmConfig>) -> ConfiguredAdvisor {
    match llm {
        Some(llm) => ConfiguredAdvisor::Http(HttpAdvisor::new(llm.provider.clone(), llm.api_key.clone(), llm.model.clone())),
        None => ConfiguredAdvisor::Disabled(NoOpAdvisor::new()),
    }
}

#[async_trait]
impl Advisor for ConfiguredAdvisor {
    async fn classify(&self, message: &str, context: &[ContextRecord]) -> Result<AdvisorResult, AdvisorError> {
        match self {
            ConfiguredAdvisor::Http(advisor) => advisor.classify(message, context).await,
            ConfiguredAdvisor::Disabled(advisor) => advisor.classify(message, context).await,
        }
    }

    async fn quota(&self) -> Quota {
        match self {
            ConfiguredAdvisor::Http(advisor) => advisor.quota().await,
            ConfiguredAdvisor::Disabled(advisor) => advisor.quota().await,
        }
    }
}

#[cfg(test)]
#[path = "advisor_tests.rs"]
mod tests;
