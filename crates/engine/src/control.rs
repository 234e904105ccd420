// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound control-command parsing and the data needed to answer them (§4.8).

use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use telewatch_core::SourceId;

const LOGS_REPLY_LINES: usize = 15;

/// A recognized inbound command. Anything else (including non-command text)
/// parses to `Unknown` and is ignored by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Status,
    Pause,
    Resume,
    Logs,
    Unknown,
}

impl Command {
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "/status" => Command::Status,
            "/pause" => Command::Pause,
            "/resume" => Command::Resume,
            "/logs" => Command::Logs,
            _ => Command::Unknown,
        }
    }
}

/// Tracks the last [`LOGS_REPLY_LINES`] raw lines per source, and which
/// source most recently delivered a record, for `/logs` replies.
#[derive(Default)]
pub struct RecentLines {
    lines: HashMap<SourceId, VecDeque<String>>,
    most_recent: Option<SourceId>,
}

impl RecentLines {
    pub fn record(&mut self, source_id: &SourceId, raw_line: &str) {
        let queue = self.lines.entry(source_id.clone()).or_default();
        queue.push_back(raw_line.to_string());
        while queue.len() > LOGS_REPLY_LINES {
            queue.pop_front();
        }
        self.most_recent = Some(source_id.clone());
    }

    /// Escape a line for the chat platform: neutralize markdown control
    /// characters that would otherwise break message formatting.
    fn escape(line: &str) -> String {
        line.replace('\\', "\\\\")
            .replace('`', "\\`")
            .replace('*', "\\*")
            .replace('_', "\\_")
    }

    /// Reply text for `/logs`: the last lines from the most recently active
    /// source, escaped for the chat platform.
    pub fn logs_reply(&self) -> String {
        let Some(source_id) = &self.most_recent else {
            return "no records received yet".to_string();
        };
        let Some(queue) = self.lines.get(source_id) else {
            return "no records received yet".to_string();
        };
        let body: String = queue.iter().map(|l| Self::escape(l)).collect::<Vec<_>>().join("\n");
        format!("last {} lines from {}:\n{}", queue.len(), source_id, body)
    }
}

/// Everything needed to answer a `/status` command, assembled by the
/// pipeline from the progress tracker, dispatcher, and uptime clock.
pub struct StatusSnapshot {
    pub fraction: f64,
    pub active_stage: Option<String>,
    pub rate_per_sec: f64,
    pub uptime: Duration,
    pub paused: bool,
    pub last_event_summary: Option<String>,
}

impl StatusSnapshot {
    pub fn format(&self) -> String {
        let stage = self.active_stage.as_deref().unwrap_or("none");
        let last = self.last_event_summary.as_deref().unwrap_or("none");
        format!(
            "progress: {:.0}%\nstage: {stage}\nrate: {:.2}/s\nuptime: {}\npaused: {}\nlast event: {last}",
            self.fraction * 100.0,
            self.rate_per_sec,
            telewatch_core::format_elapsed(self.uptime.as_secs()),
            self.paused,
        )
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
