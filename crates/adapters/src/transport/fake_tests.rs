// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn records_sent_messages_in_order() {
    let transport = FakeTransport::new();
    transport.send("first").await.unwrap();
    transport.send("second").await.unwrap();
    assert_eq!(
        transport.sent(),
        vec![
            SentMessage { text: "first".into() },
            SentMessage { text: "second".into() },
        ]
    );
}

#[tokio::test]
async fn queued_inbound_messages_are_consumed_fifo() {
    let transport = FakeTransport::new();
    transport.push_inbound("/status");
    transport.push_inbound("/pause");
    assert_eq!(transport.poll_inbound().await.unwrap().text, "/status");
    assert_eq!(transport.poll_inbound().await.unwrap().text, "/pause");
    assert!(transport.poll_inbound().await.is_none());
}

#[tokio::test]
async fn fail_next_send_fails_exactly_once() {
    let transport = FakeTransport::new();
    transport.fail_next_send();
    assert!(transport.send("a").await.is_err());
    transport.send("b").await.unwrap();
    assert_eq!(transport.sent(), vec![SentMessage { text: "b".into() }]);
}
