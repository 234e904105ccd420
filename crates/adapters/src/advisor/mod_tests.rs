// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn max_summary_len_matches_wire_contract() {
    assert_eq!(AdvisorResult::MAX_SUMMARY_LEN, 280);
}
