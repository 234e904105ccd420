// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

fn stages() -> Vec<Stage> {
    vec![
        Stage {
            name: "compile".into(),
            start_pattern: "^Compiling".into(),
            weight: 1.0,
        },
        Stage {
            name: "test".into(),
            start_pattern: "^Running tests".into(),
            weight: 2.0,
        },
        Stage {
            name: "deploy".into(),
            start_pattern: "^Deploying".into(),
            weight: 1.0,
        },
    ]
}

#[test]
fn activating_a_stage_marks_priors_done() {
    let now = Instant::now();
    let mut state = ProgressState::new("build".into(), stages(), now);
    state.activate_stage(1, now);
    assert_eq!(state.stage_states[0].status, StageStatus::Done);
    assert_eq!(state.stage_states[1].status, StageStatus::Active);
    assert_eq!(state.stage_states[2].status, StageStatus::Pending);
    assert_eq!(state.active_stage_index(), Some(1));
}

#[test]
fn fresh_state_has_no_active_stage() {
    let now = Instant::now();
    let state = ProgressState::new("build".into(), stages(), now);
    assert_eq!(state.active_stage_index(), None);
}

#[test]
fn should_emit_progress_requires_milestone_and_interval() {
    let t0 = Instant::now();
    let mut state = ProgressState::new("build".into(), vec![], t0);
    state.fraction = 0.05;
    assert!(!state.should_emit_progress(t0, 0.10, 60), "below milestone granularity");

    state.fraction = 0.15;
    assert!(state.should_emit_progress(t0, 0.10, 60), "first emission has no prior timestamp");

    state.mark_emitted(t0);
    state.fraction = 0.20;
    let too_soon = t0 + Duration::from_secs(10);
    assert!(
        !state.should_emit_progress(too_soon, 0.10, 60),
        "within min interval despite crossing milestone"
    );

    let later = t0 + Duration::from_secs(61);
    assert!(state.should_emit_progress(later, 0.10, 60));
}
