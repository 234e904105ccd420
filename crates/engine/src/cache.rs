// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Analysis cache: LRU + TTL eviction over `telewatch_core::CacheEntry` (§4.4).
//!
//! The entry type itself lives in `telewatch-core`; this is the owning
//! collection, capacity 512 with 24h TTL, consulted before the advisor.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use telewatch_core::{CacheEntry, ClassificationSource, Fingerprint, Severity};

pub const DEFAULT_CAPACITY: usize = 512;
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct Inner {
    entries: HashMap<Fingerprint, CacheEntry>,
    /// Recency order, most-recently-used at the back. Lazily compacted.
    order: Vec<Fingerprint>,
    capacity: usize,
    ttl: Duration,
}

/// Shared, lockable analysis cache. Cloning shares the same underlying map
/// (§5: "the analysis cache ... is shared across all classifier calls").
#[derive(Clone)]
pub struct AnalysisCache {
    inner: Arc<Mutex<Inner>>,
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl AnalysisCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                order: Vec::new(),
                capacity,
                ttl,
            })),
        }
    }

    /// Look up `fingerprint`, expiring it first if its TTL has lapsed.
    /// On hit, touches the entry and bumps its recency.
    pub fn get(&self, fingerprint: &Fingerprint, now: Instant) -> Option<(Severity, String)> {
        let mut inner = self.inner.lock();
        let ttl = inner.ttl;
        let expired = inner
            .entries
            .get(fingerprint)
            .map(|e| e.is_expired(now, ttl))
            .unwrap_or(false);
        if expired {
            inner.entries.remove(fingerprint);
            inner.order.retain(|f| f != fingerprint);
            return None;
        }
        let entry = inner.entries.get_mut(fingerprint)?;
        entry.touch(now);
        let result = (entry.severity, entry.summary.clone());
        inner.order.retain(|f| f != fingerprint);
        inner.order.push(fingerprint.clone());
        Some(result)
    }

    /// Insert or refresh a classification, evicting the least-recently-used
    /// entry if this insertion would exceed capacity.
    pub fn insert(
        &self,
        fingerprint: Fingerprint,
        severity: Severity,
        summary: String,
        now: Instant,
        source: ClassificationSource,
    ) {
        let mut inner = self.inner.lock();
        if inner.entries.contains_key(&fingerprint) {
            inner.order.retain(|f| f != &fingerprint);
        } else if inner.entries.len() >= inner.capacity {
            if !inner.order.is_empty() {
                let lru = inner.order.remove(0);
                inner.entries.remove(&lru);
            }
        }
        inner.order.push(fingerprint.clone());
        inner
            .entries
            .insert(fingerprint.clone(), CacheEntry::new(fingerprint, severity, summary, now, source));
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
