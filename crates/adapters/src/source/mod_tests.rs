// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn backoff_doubles_up_to_sixty_second_cap() {
    assert_eq!(backoff_delay(0), Duration::from_secs(1));
    assert_eq!(backoff_delay(1), Duration::from_secs(2));
    assert_eq!(backoff_delay(2), Duration::from_secs(4));
    assert_eq!(backoff_delay(6), Duration::from_secs(60), "64 would exceed cap");
    assert_eq!(backoff_delay(20), Duration::from_secs(60));
}
