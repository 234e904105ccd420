// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::build;
use telewatch_core::config::{ConfigError, MonitorConfig, MonitorType};
use telewatch_core::SourceKind;

fn monitor(kind: MonitorType) -> MonitorConfig {
    MonitorConfig {
        kind,
        path: (kind == MonitorType::File).then(|| "/var/log/app.log".to_string()),
        pid: (kind == MonitorType::Pid).then_some(4242),
        unit: (kind == MonitorType::Journal).then(|| "app.service".to_string()),
        keywords: vec!["ERROR".to_string()],
        check_interval_secs: 30,
    }
}

#[test]
fn builds_one_adapter_per_monitor_in_order() {
    let monitors = vec![monitor(MonitorType::File), monitor(MonitorType::Pid), monitor(MonitorType::Journal)];
    let adapters = build(&monitors).unwrap();
    assert_eq!(adapters.len(), 3);
    assert_eq!(adapters[0].descriptor().kind, SourceKind::File);
    assert_eq!(adapters[1].descriptor().kind, SourceKind::Pid);
    assert_eq!(adapters[2].descriptor().kind, SourceKind::Journal);
}

#[test]
fn carries_keywords_onto_the_descriptor() {
    let monitors = vec![monitor(MonitorType::File)];
    let adapters = build(&monitors).unwrap();
    assert_eq!(adapters[0].descriptor().keywords, vec!["ERROR".to_string()]);
}

#[test]
fn source_ids_are_stable_by_position() {
    let monitors = vec![monitor(MonitorType::File), monitor(MonitorType::Pid)];
    let adapters = build(&monitors).unwrap();
    assert_eq!(adapters[0].descriptor().id.as_str(), "source-0");
    assert_eq!(adapters[1].descriptor().id.as_str(), "source-1");
}

#[test]
fn missing_required_field_is_a_config_error_not_a_panic() {
    let mut unvalidated = monitor(MonitorType::File);
    unvalidated.path = None;
    let err = build(&[unvalidated]).unwrap_err();
    assert!(matches!(err, ConfigError::MissingPath { index: 0 }));
}
