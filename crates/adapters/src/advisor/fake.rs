// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted advisor for tests: returns queued results, counts calls.

use super::{Advisor, AdvisorError, AdvisorResult, ContextRecord, Quota};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use telewatch_core::Severity;

struct FakeAdvisorState {
    queued_results: VecDeque<Result<AdvisorResult, AdvisorError>>,
    quota: Quota,
}

#[derive(Clone)]
pub struct FakeAdvisor {
    inner: Arc<Mutex<FakeAdvisorState>>,
    call_count: Arc<AtomicU32>,
}

impl Default for FakeAdvisor {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeAdvisorState {
                queued_results: VecDeque::new(),
                quota: Quota::Ok,
            })),
            call_count: Arc::new(AtomicU32::new(0)),
        }
    }
}

impl FakeAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_result(&self, result: Result<AdvisorResult, AdvisorError>) {
        self.inner.lock().queued_results.push_back(result);
    }

    pub fn set_quota(&self, quota: Quota) {
        self.inner.lock().quota = quota;
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Advisor for FakeAdvisor {
    async fn classify(
        &self,
        _message: &str,
        _context: &[ContextRecord],
    ) -> Result<AdvisorResult, AdvisorError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.inner
            .lock()
            .queued_results
            .pop_front()
            .unwrap_or_else(|| Err(AdvisorError::Transport("no scripted result queued".into())))
    }

    async fn quota(&self) -> Quota {
        self.inner.lock().quota
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
