// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn differing_timestamps_collapse_to_same_fingerprint() {
    let a = fingerprint("2024-01-01T00:00:00Z connection reset");
    let b = fingerprint("2024-06-15T12:30:45.123Z connection reset");
    assert_eq!(a, b);
}

#[test]
fn differing_integers_collapse_to_same_fingerprint() {
    let a = fingerprint("retry attempt 3 of 5 failed");
    let b = fingerprint("retry attempt 41 of 99 failed");
    assert_eq!(a, b);
}

#[test]
fn differing_uuids_collapse_to_same_fingerprint() {
    let a = fingerprint("request 550e8400-e29b-41d4-a716-446655440000 timed out");
    let b = fingerprint("request 123e4567-e89b-12d3-a456-426614174000 timed out");
    assert_eq!(a, b);
}

#[test]
fn differing_ips_collapse_to_same_fingerprint() {
    let a = fingerprint("connection from 10.0.0.1 refused");
    let b = fingerprint("connection from 192.168.1.254 refused");
    assert_eq!(a, b);
}

#[test]
fn differing_paths_collapse_to_same_fingerprint() {
    let a = fingerprint("failed to open /var/log/app/run.log");
    let b = fingerprint("failed to open /tmp/other/file.txt");
    assert_eq!(a, b);
}

#[test]
fn hex_runs_are_collapsed() {
    let fp = fingerprint("checksum mismatch: expected deadbeef1234 got cafebabe5678");
    assert!(!fp.as_str().contains("deadbeef1234"));
    assert!(fp.as_str().contains("<HEX>"));
}

#[test]
fn whitespace_is_collapsed_and_trimmed() {
    let fp = fingerprint("  too    much     whitespace   here  ");
    assert_eq!(fp.as_str(), "too much whitespace here");
}

#[test]
fn long_messages_are_truncated_to_200_chars() {
    let long = "word ".repeat(100);
    let fp = fingerprint(&long);
    assert!(fp.as_str().chars().count() <= 200);
}

#[test]
fn distinct_messages_stay_distinct() {
    let a = fingerprint("disk usage at 80 percent");
    let b = fingerprint("memory usage at 80 percent");
    assert_ne!(a, b);
}

#[test]
fn floats_are_replaced_before_being_seen_as_separate_integers() {
    let fp = fingerprint("load average 3.14 over 5 minutes");
    assert_eq!(fp.as_str(), "load average <F> over <N> minutes");
}
