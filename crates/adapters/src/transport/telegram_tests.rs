// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn api_url_embeds_token_and_method() {
    let transport = TelegramTransport::new("TOKEN123", "chat-1");
    assert_eq!(
        transport.api_url("sendMessage"),
        "https://api.telegram.org/botTOKEN123/sendMessage"
    );
}

#[test]
fn dropped_count_starts_at_zero() {
    let transport = TelegramTransport::new("t", "c");
    assert_eq!(transport.dropped_count(), 0);
}

#[test]
fn retry_schedule_has_five_attempts_per_spec() {
    assert_eq!(RETRY_DELAYS_SECS.len(), 5);
    assert_eq!(RETRY_DELAYS_SECS, [1, 2, 4, 8, 16]);
}
