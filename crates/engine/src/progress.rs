// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress tracker: regex/stage fraction tracking plus historical duration
//! learning (§4.7).

use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;
use telewatch_core::{Event, ProgressState, Reason, Severity, SourceId, Stage, StageStatus};

use crate::error::EngineError;

/// Trailing completions kept per process name for the historical median.
const HISTORY_DEPTH: usize = 10;

struct Lazy {
    pattern: &'static str,
    cell: OnceLock<Regex>,
}

impl Lazy {
    const fn new(pattern: &'static str) -> Self {
        Self {
            pattern,
            cell: OnceLock::new(),
        }
    }

    #[allow(clippy::expect_used)]
    fn get(&self) -> &Regex {
        self.cell
            .get_or_init(|| Regex::new(self.pattern).expect("progress pattern is valid regex"))
    }
}

static FRACTION_RE: Lazy = Lazy::new(r"(\d+)/(\d+)");
static PERCENT_RE: Lazy = Lazy::new(r"(\d+(?:\.\d+)?)\s*%");
static EPOCH_RE: Lazy = Lazy::new(r"(?i)epoch\s+(\d+)\s+of\s+(\d+)");

/// A fraction derived from a regex match against a raw line, in `[0.0, 1.0]`.
fn regex_progress(line: &str) -> Option<f64> {
    if let Some(caps) = FRACTION_RE.get().captures(line) {
        let num: f64 = caps[1].parse().ok()?;
        let den: f64 = caps[2].parse().ok()?;
        if den > 0.0 {
            return Some((num / den).clamp(0.0, 1.0));
        }
    }
    if let Some(caps) = EPOCH_RE.get().captures(line) {
        let num: f64 = caps[1].parse().ok()?;
        let den: f64 = caps[2].parse().ok()?;
        if den > 0.0 {
            return Some((num / den).clamp(0.0, 1.0));
        }
    }
    if let Some(caps) = PERCENT_RE.get().captures(line) {
        let pct: f64 = caps[1].parse().ok()?;
        return Some((pct / 100.0).clamp(0.0, 1.0));
    }
    None
}

/// On-disk, per-process completion-duration history (§4.7, §5 persisted state).
#[derive(Default)]
pub struct HistoryStore {
    durations: HashMap<String, Vec<f64>>,
    path: Option<PathBuf>,
}

impl HistoryStore {
    /// Load `~/.telewatch/history.json`, tolerating a missing or corrupt file
    /// by starting with an empty history (§7: "History file corrupt → warn,
    /// proceed with empty history").
    pub fn load_default() -> Self {
        let path = dirs::home_dir().map(|home| home.join(".telewatch").join("history.json"));
        match &path {
            Some(p) => Self::load(p.clone()),
            None => {
                tracing::warn!("could not resolve home directory, history disabled");
                Self { durations: HashMap::new(), path: None }
            }
        }
    }

    fn load(path: PathBuf) -> Self {
        match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, Vec<f64>>>(&raw) {
                Ok(durations) => Self { durations, path: Some(path) },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "history file corrupt, starting empty");
                    Self { durations: HashMap::new(), path: Some(path) }
                }
            },
            Err(_) => Self { durations: HashMap::new(), path: Some(path) },
        }
    }

    /// Median of the trailing entries recorded for `process_name`, if any.
    pub fn median_duration(&self, process_name: &str) -> Option<f64> {
        let entries = self.durations.get(process_name)?;
        if entries.is_empty() {
            return None;
        }
        let mut sorted = entries.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = sorted.len() / 2;
        Some(if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        })
    }

    /// Record a completion, trimming to the trailing `HISTORY_DEPTH` entries,
    /// and persist atomically (write a sibling temp file, then rename).
    pub fn record_completion(&mut self, process_name: &str, duration_secs: f64) -> Result<(), EngineError> {
        let entries = self.durations.entry(process_name.to_string()).or_default();
        entries.push(duration_secs);
        if entries.len() > HISTORY_DEPTH {
            let excess = entries.len() - HISTORY_DEPTH;
            entries.drain(0..excess);
        }
        self.persist()
    }

    fn persist(&self) -> Result<(), EngineError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.durations).map_err(|e| EngineError::HistoryCorrupt {
            path: path.display().to_string(),
            source: e,
        })?;
        write_atomic(path, &json).map_err(|e| EngineError::HistoryWrite {
            path: path.display().to_string(),
            source: e,
        })
    }
}

fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)
}

/// Per-process progress tracking: folds regex and stage signals into a
/// `ProgressState` and emits milestone/stage/completion events.
pub struct ProgressTracker {
    state: ProgressState,
    milestone: f64,
    min_interval_secs: u64,
}

impl ProgressTracker {
    /// `expected_duration_override_secs` is `process.expected_duration_minutes`
    /// converted to seconds, when configured; it takes precedence over the
    /// history-derived median (§6: "Overrides history median").
    pub fn new(
        process_name: String,
        stages: Vec<Stage>,
        history: &HistoryStore,
        now: Instant,
        expected_duration_override_secs: Option<f64>,
    ) -> Self {
        let mut state = ProgressState::new(process_name.clone(), stages, now);
        state.expected_duration_secs = expected_duration_override_secs.or_else(|| history.median_duration(&process_name));
        Self {
            state,
            milestone: 0.10,
            min_interval_secs: 60,
        }
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// Feed a raw line; returns any progress/stage events this line produced.
    pub fn observe(&mut self, source_id: &SourceId, seq: u64, raw_line: &str, now: Instant) -> Vec<Event> {
        let mut events = Vec::new();

        if let Some(index) = self.matching_stage(raw_line) {
            if self.state.active_stage_index() != Some(index) {
                self.state.activate_stage(index, now);
                events.push(Event::new(
                    source_id.clone(),
                    seq,
                    now,
                    Severity::Info,
                    format!("stage \"{}\" active", self.state.stages[index].name),
                    Reason::Stage,
                ));
            }
        }

        if let Some(fraction) = regex_progress(raw_line) {
            self.state.fraction = self.state.fraction.max(fraction);
        } else {
            self.recompute_stage_fraction(now);
        }

        if self.state.should_emit_progress(now, self.milestone, self.min_interval_secs) {
            self.state.mark_emitted(now);
            events.push(Event::new(
                source_id.clone(),
                seq,
                now,
                Severity::Info,
                format!("progress {:.0}%", self.state.fraction * 100.0),
                Reason::Progress,
            ));
        }

        events
    }

    /// Overall fraction folding done-stage weights with the active stage's
    /// linear interpolation (§4.7).
    fn recompute_stage_fraction(&mut self, now: Instant) {
        if self.state.stages.is_empty() {
            return;
        }
        let total_weight: f64 = self.state.stages.iter().map(|s| s.weight).sum();
        if total_weight <= 0.0 {
            return;
        }

        let mut covered = 0.0;
        for (i, stage_state) in self.state.stage_states.iter().enumerate() {
            let weight = self.state.stages[i].weight;
            match stage_state.status {
                StageStatus::Done => covered += weight,
                StageStatus::Active => {
                    let active_fraction = self.active_stage_fraction(i, now);
                    covered += weight * active_fraction;
                }
                StageStatus::Pending => {}
            }
        }
        let computed = (covered / total_weight).clamp(0.0, 1.0);
        self.state.fraction = self.state.fraction.max(computed);
    }

    /// Fraction of the active stage's own span elapsed: either the gap to the
    /// next stage's start (unknown here, since that's only known in
    /// hindsight) or the historical-median-scaled elapsed time, whichever the
    /// data supports (§4.7).
    fn active_stage_fraction(&self, index: usize, now: Instant) -> f64 {
        let Some(started_at) = self.state.stage_states[index].started_at else {
            return 0.0;
        };
        let elapsed = now.saturating_duration_since(started_at).as_secs_f64();
        let total_weight: f64 = self.state.stages.iter().map(|s| s.weight).sum();
        let weight = self.state.stages[index].weight;
        match self.state.expected_duration_secs {
            Some(expected) if expected > 0.0 && total_weight > 0.0 => {
                let stage_budget = expected * weight / total_weight;
                (elapsed / stage_budget).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    fn matching_stage(&self, raw_line: &str) -> Option<usize> {
        self.state.stages.iter().position(|stage| {
            Regex::new(&stage.start_pattern)
                .map(|re| re.is_match(raw_line))
                .unwrap_or(false)
        })
    }

    /// Mark the process complete: emits a `Reason::Completion` event and
    /// records the elapsed duration into `history` for future median lookups.
    pub fn complete(&mut self, source_id: &SourceId, seq: u64, history: &mut HistoryStore, now: Instant) -> Event {
        self.state.fraction = 1.0;
        let duration_secs = now.saturating_duration_since(self.state.started_at).as_secs_f64();
        if let Err(e) = history.record_completion(&self.state.process_name, duration_secs) {
            tracing::warn!(error = %e, "failed to persist completion history");
        }
        Event::new(
            source_id.clone(),
            seq,
            now,
            Severity::Info,
            format!("\"{}\" completed in {:.0}s", self.state.process_name, duration_secs),
            Reason::Completion,
        )
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
