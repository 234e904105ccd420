// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use telewatch_core::config::LlmConfig;

#[tokio::test]
async fn no_llm_config_selects_disabled_advisor() {
    let advisor = build(None);
    assert!(matches!(advisor, ConfiguredAdvisor::Disabled(_)));
    assert_eq!(advisor.quota().await, Quota::Exhausted);
    assert!(advisor.classify("boom", &[]).await.is_err());
}

#[test]
fn llm_config_selects_http_advisor() {
    let llm = LlmConfig {
        provider: "https://example.test/v1/classify".to_string(),
        api_key: "key".to_string(),
        model: "test-model".to_string(),
    };
    let advisor = build(Some(&llm));
    assert!(matches!(advisor, ConfiguredAdvisor::Http(_)));
}
