// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn short_text_is_a_single_chunk() {
    let chunks = split_for_transport("hello world");
    assert_eq!(chunks, vec!["hello world".to_string()]);
}

#[test]
fn long_text_splits_at_line_boundaries() {
    let line = "a".repeat(100);
    let text = std::iter::repeat(line.clone())
        .take((MAX_MESSAGE_LEN / 101) + 10)
        .collect::<Vec<_>>()
        .join("\n");
    let chunks = split_for_transport(&text);
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.chars().count() <= MAX_MESSAGE_LEN);
    }
    assert_eq!(chunks.concat(), text);
}

#[test]
fn single_oversized_line_is_hard_split() {
    let text = "x".repeat(MAX_MESSAGE_LEN * 2 + 5);
    let chunks = split_for_transport(&text);
    assert!(chunks.len() >= 2);
    for chunk in &chunks {
        assert!(chunk.chars().count() <= MAX_MESSAGE_LEN);
    }
}

#[test]
fn command_detection_requires_leading_slash() {
    assert!(InboundMessage { text: "/status".into() }.is_command());
    assert!(!InboundMessage { text: "status".into() }.is_command());
}
