// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use telewatch_core::{SourceId, SourceKind};

fn descriptor() -> SourceDescriptor {
    SourceDescriptor {
        id: SourceId::new("svc"),
        kind: SourceKind::Journal,
        location: "my.service".into(),
        keywords: vec![],
        display_name: "svc".into(),
    }
}

#[test]
fn descriptor_accessor_returns_configured_id() {
    let reader = JournalReader::new(descriptor(), "my.service".into());
    assert_eq!(reader.descriptor().id.as_str(), "svc");
}

#[tokio::test]
async fn spawn_follower_builds_without_panicking_even_if_journalctl_is_absent() {
    let reader = JournalReader::new(descriptor(), "my.service".into());
    // journalctl may not exist on the test host (e.g. non-systemd CI); a
    // spawn failure here is a legitimate Err, not a test bug.
    let _ = reader.spawn_follower();
}
