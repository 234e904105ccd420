// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher: debounce, rate limit, pause queue, and transport send (§4.8).

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use telewatch_adapters::transport::{split_for_transport, Transport};
use telewatch_core::{Event, Severity};

/// Coalescing window: events sharing a debounce key within this interval
/// are collapsed into one send plus a follow-up count (§4.7).
const DEBOUNCE_WINDOW_SECS: u64 = 300;
/// Critical-severity bypass of the rate limit is itself rate-limited.
const BYPASS_INTERVAL_SECS: u64 = 60;
/// Paused-event queue capacity (§4.8).
const PAUSED_QUEUE_CAPACITY: usize = 50;

type DebounceKey = (Severity, telewatch_core::Reason, String);

struct DebounceEntry {
    suppressed_count: u32,
    window_ends_at: Instant,
}

pub struct DispatcherConfig {
    pub rate_limit_per_hour: u32,
    pub debounce_seconds: u64,
    pub severity_levels: Vec<Severity>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            rate_limit_per_hour: 10,
            debounce_seconds: DEBOUNCE_WINDOW_SECS,
            severity_levels: vec![Severity::Info, Severity::Warning, Severity::Critical],
        }
    }
}

/// Consumes classified `Event`s and decides what, if anything, reaches the
/// transport, applying debounce, rate limiting, and pause semantics.
pub struct Dispatcher<T: Transport> {
    transport: T,
    config: DispatcherConfig,
    debounced: HashMap<DebounceKey, DebounceEntry>,
    send_log: VecDeque<Instant>,
    dropped_count: u32,
    last_critical_sent_at: Option<Instant>,
    paused: bool,
    paused_queue: VecDeque<Event>,
    last_event: Option<Event>,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T, config: DispatcherConfig) -> Self {
        Self {
            transport,
            config,
            debounced: HashMap::new(),
            send_log: VecDeque::new(),
            dropped_count: 0,
            last_critical_sent_at: None,
            paused: false,
            paused_queue: VecDeque::new(),
            last_event: None,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume sending and flush a single digest message summarizing whatever
    /// accumulated in the paused queue (§4.8, §11 supplement).
    pub async fn resume(&mut self) {
        self.paused = false;
        if self.paused_queue.is_empty() {
            return;
        }
        let digest = self.build_digest();
        self.paused_queue.clear();
        let _ = self.send_raw(&digest).await;
    }

    fn build_digest(&self) -> String {
        let mut counts: HashMap<Severity, u32> = HashMap::new();
        for event in &self.paused_queue {
            *counts.entry(event.severity).or_default() += 1;
        }
        let mut parts: Vec<String> = Vec::new();
        for severity in [Severity::Critical, Severity::Warning, Severity::Info] {
            if let Some(count) = counts.get(&severity) {
                parts.push(format!("{count} {severity}"));
            }
        }
        format!("resumed: {} events while paused ({})", self.paused_queue.len(), parts.join(", "))
    }

    /// Accept one classified event, applying debounce/rate-limit/pause rules
    /// and sending through the transport when eligible.
    pub async fn dispatch(&mut self, event: Event, now: Instant) {
        self.last_event = Some(event.clone());

        if !self.config.severity_levels.contains(&event.severity) {
            return;
        }

        if self.paused {
            if self.paused_queue.len() >= PAUSED_QUEUE_CAPACITY {
                self.paused_queue.pop_front();
            }
            self.paused_queue.push_back(event);
            return;
        }

        let key = event.debounce_key();
        if let Some(entry) = self.debounced.get_mut(&key) {
            if now < entry.window_ends_at {
                entry.suppressed_count += 1;
                return;
            }
            let suppressed = entry.suppressed_count;
            self.debounced.remove(&key);
            if suppressed > 0 {
                let follow_up = format!("plus {suppressed} similar in the last 5 minutes");
                self.try_send(&follow_up, event.severity, now).await;
            }
        }

        self.debounced.insert(
            key,
            DebounceEntry {
                suppressed_count: 0,
                window_ends_at: now + Duration::from_secs(self.config.debounce_seconds),
            },
        );

        let text = self.format_event(&event);
        self.try_send(&text, event.severity, now).await;
    }

    fn format_event(&self, event: &Event) -> String {
        let base = format!("[{}] {}", event.severity, event.summary);
        match &event.detail {
            Some(detail) => format!("{base} ({detail})"),
            None => base,
        }
    }

    async fn try_send(&mut self, text: &str, severity: Severity, now: Instant) {
        if self.within_rate_limit(now) {
            self.send_log.push_back(now);
            let _ = self.send_raw(text).await;
            if severity == Severity::Critical {
                self.last_critical_sent_at = Some(now);
            }
            return;
        }

        if severity == Severity::Critical {
            let bypass_ready = self
                .last_critical_sent_at
                .map(|t| now.saturating_duration_since(t).as_secs() >= BYPASS_INTERVAL_SECS)
                .unwrap_or(true);
            if bypass_ready {
                self.last_critical_sent_at = Some(now);
                let _ = self.send_raw(text).await;
                return;
            }
        }

        self.dropped_count += 1;
    }

    async fn send_raw(&mut self, text: &str) -> bool {
        let text = if self.dropped_count > 0 {
            format!("{text}\n({} message(s) dropped by rate limit)", self.dropped_count)
        } else {
            text.to_string()
        };
        let mut ok = true;
        for chunk in split_for_transport(&text) {
            if self.transport.send(&chunk).await.is_err() {
                ok = false;
            }
        }
        if ok {
            self.dropped_count = 0;
        }
        ok
    }

    fn within_rate_limit(&mut self, now: Instant) -> bool {
        let cutoff = Duration::from_secs(60 * 60);
        while let Some(&front) = self.send_log.front() {
            if now.saturating_duration_since(front) > cutoff {
                self.send_log.pop_front();
            } else {
                break;
            }
        }
        (self.send_log.len() as u32) < self.config.rate_limit_per_hour
    }

    pub fn dropped_count(&self) -> u32 {
        self.dropped_count
    }

    pub fn last_event(&self) -> Option<&Event> {
        self.last_event.as_ref()
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
