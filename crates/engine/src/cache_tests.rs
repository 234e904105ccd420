// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use telewatch_core::fingerprint;

#[test]
fn miss_on_empty_cache() {
    let cache = AnalysisCache::default();
    assert!(cache.get(&fingerprint("boom"), Instant::now()).is_none());
}

#[test]
fn insert_then_hit() {
    let cache = AnalysisCache::default();
    let fp = fingerprint("disk full");
    let now = Instant::now();
    cache.insert(fp.clone(), Severity::Warning, "disk full".into(), now, ClassificationSource::Advisor);
    let (severity, summary) = cache.get(&fp, now).expect("expected hit");
    assert_eq!(severity, Severity::Warning);
    assert_eq!(summary, "disk full");
}

#[test]
fn expired_entry_is_a_miss() {
    let cache = AnalysisCache::new(DEFAULT_CAPACITY, Duration::from_secs(10));
    let fp = fingerprint("x");
    let now = Instant::now();
    cache.insert(fp.clone(), Severity::Info, "x".into(), now, ClassificationSource::Local);
    let later = now + Duration::from_secs(11);
    assert!(cache.get(&fp, later).is_none());
    assert!(cache.is_empty());
}

#[test]
fn evicts_least_recently_used_at_capacity() {
    let cache = AnalysisCache::new(2, DEFAULT_TTL);
    let now = Instant::now();
    let a = fingerprint("a");
    let b = fingerprint("b");
    let c = fingerprint("c");
    cache.insert(a.clone(), Severity::Info, "a".into(), now, ClassificationSource::Local);
    cache.insert(b.clone(), Severity::Info, "b".into(), now, ClassificationSource::Local);
    // touch `a` so `b` becomes the least-recently-used entry
    cache.get(&a, now);
    cache.insert(c.clone(), Severity::Info, "c".into(), now, ClassificationSource::Local);

    assert!(cache.get(&b, now).is_none());
    assert!(cache.get(&a, now).is_some());
    assert!(cache.get(&c, now).is_some());
}
