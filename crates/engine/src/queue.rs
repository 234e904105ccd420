// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shared record queue every source adapter delivers into (§5).
//!
//! Backpressured rather than truly unbounded: once the high-water mark is
//! hit, the oldest record that didn't match its source's keyword filter is
//! evicted to make room. If every queued record matched a filter, the
//! actual oldest record is evicted instead — the bound must hold regardless.

use std::collections::VecDeque;
use telewatch_core::LogRecord;
use tokio::sync::Notify;

/// High-water mark before backpressure eviction kicks in (§5).
pub const DEFAULT_CAPACITY: usize = 10_000;

struct QueuedRecord {
    record: LogRecord,
    keyword_matched: bool,
}

struct Inner {
    records: VecDeque<QueuedRecord>,
    capacity: usize,
    dropped_since_last_notice: u64,
}

/// Single-consumer queue shared by every source task.
pub struct RecordQueue {
    inner: parking_lot::Mutex<Inner>,
    notify: Notify,
}

impl RecordQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: parking_lot::Mutex::new(Inner {
                records: VecDeque::new(),
                capacity,
                dropped_since_last_notice: 0,
            }),
            notify: Notify::new(),
        }
    }

    /// Push a record; `keyword_matched` marks it as protected from eviction
    /// under pressure. Returns `Some(dropped_count)` if pushing this record
    /// caused an eviction (§5's "dropped with a warning event").
    pub fn push(&self, record: LogRecord, keyword_matched: bool) -> Option<u64> {
        let mut inner = self.inner.lock();
        inner.records.push_back(QueuedRecord { record, keyword_matched });

        let mut evicted = false;
        if inner.records.len() > inner.capacity {
            let victim = inner
                .records
                .iter()
                .position(|q| !q.keyword_matched)
                .unwrap_or(0);
            inner.records.remove(victim);
            inner.dropped_since_last_notice += 1;
            evicted = true;
        }
        drop(inner);
        self.notify.notify_one();

        if evicted {
            let mut inner = self.inner.lock();
            let count = inner.dropped_since_last_notice;
            inner.dropped_since_last_notice = 0;
            Some(count)
        } else {
            None
        }
    }

    /// Pop the oldest record, waiting if the queue is currently empty.
    pub async fn pop(&self) -> LogRecord {
        loop {
            if let Some(queued) = self.inner.lock().records.pop_front() {
                return queued.record;
            }
            self.notify.notified().await;
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
