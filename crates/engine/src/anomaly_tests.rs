// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use telewatch_core::fingerprint;

fn source() -> SourceId {
    SourceId::new("src")
}

#[test]
fn no_spike_on_steady_low_rate() {
    let mut detector = AnomalyDetector::new(AnomalyConfig::default());
    let mut now = Instant::now();
    let mut fired = false;
    for _ in 0..30 {
        now += Duration::from_millis(500);
        if detector.observe_arrival(&source(), 2.0, now).is_some() {
            fired = true;
        }
    }
    assert!(!fired, "steady ~2/s traffic should not trigger a spike");
}

#[test]
fn spike_fires_on_burst_above_threshold() {
    let mut detector = AnomalyDetector::new(AnomalyConfig::default());
    let mut now = Instant::now();
    // Warm up with a sparse steady rate so EWMA/baseline are low.
    for _ in 0..10 {
        now += Duration::from_secs(1);
        detector.observe_arrival(&source(), 0.5, now);
    }
    // Now burst: far more records per second than 3x baseline.
    let mut fired = false;
    for _ in 0..20 {
        now += Duration::from_millis(50);
        if detector.observe_arrival(&source(), 0.5, now).is_some() {
            fired = true;
        }
    }
    assert!(fired, "a sharp burst should trigger exactly one spike event");
}

#[test]
fn spike_is_suppressed_for_60s_after_firing() {
    let mut detector = AnomalyDetector::new(AnomalyConfig::default());
    let mut now = Instant::now();
    for _ in 0..10 {
        now += Duration::from_secs(1);
        detector.observe_arrival(&source(), 0.5, now);
    }
    let mut fire_count = 0;
    for _ in 0..40 {
        now += Duration::from_millis(50);
        if detector.observe_arrival(&source(), 0.5, now).is_some() {
            fire_count += 1;
        }
    }
    assert_eq!(fire_count, 1, "spike must be suppressed for 60s after firing once");
}

#[test]
fn stall_fires_only_for_previously_active_source() {
    let mut detector = AnomalyDetector::new(AnomalyConfig {
        stall_seconds: 5,
        ..AnomalyConfig::default()
    });
    let mut now = Instant::now();
    // Not enough history yet: stall must not fire for an idle, never-active source.
    assert!(detector.check_stalls(now + Duration::from_secs(10)).is_empty());

    for _ in 0..10 {
        now += Duration::from_secs(1);
        detector.observe_arrival(&source(), 1.0, now);
    }
    let later = now + Duration::from_secs(6);
    let events = detector.check_stalls(later);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reason, Reason::Stall);
    assert_eq!(events[0].severity, Severity::Critical);

    // Suppressed on a second sweep without a new arrival.
    assert!(detector.check_stalls(later + Duration::from_secs(1)).is_empty());
}

#[test]
fn novelty_true_only_for_absent_fingerprint_with_alarm_signal() {
    let mut detector = AnomalyDetector::new(AnomalyConfig::default());
    let fp = fingerprint("something odd happened");
    assert!(!detector.observe_novelty(&source(), &fp, None, "something odd happened", false));

    let fp2 = fingerprint("panic: out of memory");
    assert!(detector.observe_novelty(&source(), &fp2, None, "panic: out of memory", false));

    // Same fingerprint again is no longer absent.
    assert!(!detector.observe_novelty(&source(), &fp2, None, "panic: out of memory", false));
}

#[test]
fn novelty_memory_evicts_oldest_past_capacity() {
    let mut detector = AnomalyDetector::new(AnomalyConfig {
        novelty_capacity: 2,
        ..AnomalyConfig::default()
    });
    let a = fingerprint("a panic");
    let b = fingerprint("b panic");
    let c = fingerprint("c panic");
    detector.observe_novelty(&source(), &a, None, "a panic", false);
    detector.observe_novelty(&source(), &b, None, "b panic", false);
    detector.observe_novelty(&source(), &c, None, "c panic", false);

    // `a` should have been evicted, so it reads as absent (novel) again.
    assert!(detector.observe_novelty(&source(), &a, None, "a panic", false));
}
