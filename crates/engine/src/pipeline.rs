// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires the individual stages into the running pipeline (§5).
//!
//! One task per source adapter, a forwarder per source bridging its
//! `mpsc` channel into the shared [`RecordQueue`], then a single task per
//! analysis stage (profiler, anomaly, progress, classifier) connected by
//! channels so a slow advisor call never blocks the next record's profiling.
//! A supervisor task owns the dispatcher, the transport's inbound command
//! stream, and periodic ticks (stall sweep, advisor quota refresh).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use regex::Regex;
use telewatch_adapters::advisor::Advisor;
use telewatch_adapters::source::SourceAdapter;
use telewatch_adapters::transport::Transport;
use telewatch_core::{
    fingerprint, Config, Event, LogRecord, Reason, Severity, SourceDescriptor, SourceId, SourceKind, Stage,
};
use tokio::sync::{broadcast, mpsc, oneshot, Mutex as AsyncMutex};

use crate::anomaly::{AnomalyConfig, AnomalyDetector};
use crate::cache::AnalysisCache;
use crate::classifier::{Classifier, ClassifierConfig};
use crate::control::{Command, RecentLines, StatusSnapshot};
use crate::dispatcher::{Dispatcher, DispatcherConfig};
use crate::error::EngineError;
use crate::profiler::Profiler;
use crate::progress::{HistoryStore, ProgressTracker};
use crate::queue::{self, RecordQueue};

/// A record in flight, carrying the decisions earlier stages already made
/// about it instead of recomputing them downstream.
struct Staged {
    record: LogRecord,
    baseline_rate: f64,
}

/// A record the anomaly stage decided is worth the classifier's attention,
/// and why.
struct Candidate {
    record: LogRecord,
    reason: Reason,
}

/// Shared counters the supervisor reads to answer `/status` without a
/// round trip into the progress task.
#[derive(Default)]
struct ProgressSnapshot {
    fraction: f64,
    active_stage: Option<String>,
    rate_per_sec: f64,
}

/// Ticks used to drive the periodic, record-independent side of the
/// pipeline (stall sweeps, advisor quota polling, inbound command polling).
const STALL_CHECK_INTERVAL: Duration = Duration::from_secs(10);
const QUOTA_REFRESH_INTERVAL: Duration = Duration::from_secs(60);
const INBOUND_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Deadline the dispatcher gets to flush and reply "stopped" before the
/// overall shutdown ceiling forces the process down (§5).
const DISPATCHER_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);
/// Overall ceiling on graceful shutdown before the caller should give up
/// waiting and exit anyway (§5, §7).
pub const SHUTDOWN_CEILING: Duration = Duration::from_secs(10);

/// Run the full pipeline until every source adapter exits or `shutdown`
/// fires. Returns once every stage has drained and the dispatcher has had
/// its chance to send a final notification.
pub async fn run<A, T>(
    sources: Vec<Box<dyn SourceAdapter>>,
    advisor: Option<A>,
    transport: T,
    config: &Config,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), EngineError>
where
    A: Advisor,
    T: Transport,
{
    if sources.is_empty() {
        return Err(EngineError::NoSources);
    }

    let queue = Arc::new(RecordQueue::new(queue::DEFAULT_CAPACITY));
    let descriptors: HashMap<SourceId, SourceDescriptor> =
        sources.iter().map(|s| (s.descriptor().id.clone(), s.descriptor().clone())).collect();

    let (events_tx, events_rx) = mpsc::channel::<Event>(1024);
    let (staged_tx, staged_rx) = mpsc::channel::<Staged>(1024);
    let (screened_tx, screened_rx) = mpsc::channel::<(LogRecord, Option<Reason>)>(1024);
    let (candidate_tx, candidate_rx) = mpsc::channel::<Candidate>(1024);

    let recent_lines = Arc::new(std::sync::Mutex::new(RecentLines::default()));
    let progress_snapshot = Arc::new(std::sync::Mutex::new(ProgressSnapshot::default()));

    let mut source_shutdowns = Vec::with_capacity(sources.len());
    let mut join_handles = Vec::new();

    for source in sources {
        let descriptor = source.descriptor().clone();
        let (tx, mut rx) = mpsc::channel::<LogRecord>(256);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        source_shutdowns.push(shutdown_tx);
        join_handles.push(tokio::spawn(source.run(tx, shutdown_rx)));

        let q = Arc::clone(&queue);
        let events_tx = events_tx.clone();
        let recent_lines = Arc::clone(&recent_lines);
        join_handles.push(tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                if let Ok(mut lines) = recent_lines.lock() {
                    lines.record(&record.source_id, &record.raw_line);
                }
                let matched = descriptor.passes_keyword_filter(&record.raw_line);
                if let Some(dropped) = q.push(record, matched) {
                    let event = Event::new(
                        descriptor.id.clone(),
                        0,
                        Instant::now(),
                        Severity::Warning,
                        "record queue under backpressure".to_string(),
                        Reason::Backpressure,
                    )
                    .with_detail(format!("{dropped} record(s) dropped since last notice"));
                    let _ = events_tx.send(event).await;
                }
            }
        }));
    }

    if config.turbo {
        // §6: turbo disables the profiler and anomaly detector; patterns,
        // keywords, and progress tracking still run.
        join_handles.push(tokio::spawn(turbo_stage(
            Arc::clone(&queue),
            screened_tx,
            descriptors.clone(),
            shutdown.resubscribe(),
        )));
    } else {
        join_handles.push(tokio::spawn(profiler_stage(
            Arc::clone(&queue),
            staged_tx,
            events_tx.clone(),
            descriptors.clone(),
            shutdown.resubscribe(),
        )));
        join_handles.push(tokio::spawn(anomaly_stage(
            staged_rx,
            screened_tx,
            events_tx.clone(),
            descriptors.clone(),
            AnomalyConfig {
                spike_threshold: config.anomaly.spike_threshold,
                stall_seconds: config.anomaly.stall_seconds,
                ..AnomalyConfig::default()
            },
            shutdown.resubscribe(),
        )));
    }
    join_handles.push(tokio::spawn(progress_stage(
        screened_rx,
        candidate_tx,
        events_tx.clone(),
        Arc::clone(&progress_snapshot),
        build_stages(config),
        config.process.name.clone().unwrap_or_else(|| "process".to_string()),
        config.process.terminal_pattern.clone(),
        config.process.expected_duration_minutes.map(|m| m * 60.0),
        descriptors.clone(),
        shutdown.resubscribe(),
    )));
    join_handles.push(tokio::spawn(classifier_stage(
        candidate_rx,
        events_tx.clone(),
        advisor,
        ClassifierConfig::default(),
        shutdown.resubscribe(),
    )));

    drop(events_tx);

    let dispatcher_config = DispatcherConfig {
        rate_limit_per_hour: config.notification.rate_limit_per_hour,
        debounce_seconds: config.notification.debounce_seconds,
        severity_levels: parse_severity_levels(&config.notification.severity_levels),
    };
    let dispatcher = Arc::new(AsyncMutex::new(Dispatcher::new(transport.clone(), dispatcher_config)));

    let started_at = Instant::now();
    let supervisor = tokio::spawn(supervise(
        events_rx,
        Arc::clone(&dispatcher),
        transport,
        Arc::clone(&progress_snapshot),
        Arc::clone(&recent_lines),
        started_at,
        shutdown.resubscribe(),
    ));

    let _ = shutdown.recv().await;
    for tx in source_shutdowns {
        let _ = tx.send(());
    }
    let drain = async {
        for handle in join_handles {
            let _ = handle.await;
        }
    };
    if tokio::time::timeout(SHUTDOWN_CEILING, drain).await.is_err() {
        tracing::warn!("stages did not drain within the shutdown ceiling, abandoning");
    }
    let _ = tokio::time::timeout(DISPATCHER_SHUTDOWN_GRACE, supervisor).await;

    Ok(())
}

fn parse_severity_levels(levels: &[String]) -> Vec<Severity> {
    let parsed: Vec<Severity> = levels
        .iter()
        .filter_map(|s| match s.to_ascii_lowercase().as_str() {
            "info" => Some(Severity::Info),
            "warning" => Some(Severity::Warning),
            "critical" => Some(Severity::Critical),
            _ => None,
        })
        .collect();
    if parsed.is_empty() {
        vec![Severity::Info, Severity::Warning, Severity::Critical]
    } else {
        parsed
    }
}

fn build_stages(config: &Config) -> Vec<Stage> {
    config
        .process
        .stages
        .iter()
        .map(|s| Stage {
            name: s.name.clone(),
            start_pattern: s.start_pattern.clone(),
            weight: s.weight,
        })
        .collect()
}

async fn profiler_stage(
    queue: Arc<RecordQueue>,
    out: mpsc::Sender<Staged>,
    events: mpsc::Sender<Event>,
    descriptors: HashMap<SourceId, SourceDescriptor>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut profilers: HashMap<SourceId, Profiler> = HashMap::new();
    loop {
        let mut record = tokio::select! {
            record = queue.pop() => record,
            _ = shutdown.recv() => return,
        };
        let now = Instant::now();
        let profiler = profilers.entry(record.source_id.clone()).or_default();
        let outcome = profiler.observe(&record.raw_line, now);
        record.fields = Some(outcome.fields);

        if outcome.reprofiled {
            let event = Event::new(
                record.source_id.clone(),
                record.seq,
                now,
                Severity::Info,
                "source format drifted, re-profiling".to_string(),
                Reason::Drift,
            );
            if events.send(event).await.is_err() {
                return;
            }
        }

        // During bootstrap the profiler needs representative, unfiltered
        // traffic (§4.2); the keyword filter only applies once it's past
        // that window.
        let keyword_dropped = !outcome.bootstrapping
            && descriptors
                .get(&record.source_id)
                .is_some_and(|d| !d.passes_keyword_filter(&record.raw_line));
        if keyword_dropped {
            continue;
        }

        let baseline_rate = profiler.profile().baseline_rate;

        if out.send(Staged { record, baseline_rate }).await.is_err() {
            return;
        }
    }
}

/// Stands in for `profiler_stage` + `anomaly_stage` under `turbo` (§6):
/// only keyword matching feeds the rest of the pipeline, skipping field
/// extraction and novelty detection entirely.
async fn turbo_stage(
    queue: Arc<RecordQueue>,
    out: mpsc::Sender<(LogRecord, Option<Reason>)>,
    descriptors: HashMap<SourceId, SourceDescriptor>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        let record = tokio::select! {
            record = queue.pop() => record,
            _ = shutdown.recv() => return,
        };
        let keyword_matched = descriptors
            .get(&record.source_id)
            .map(|d| d.passes_keyword_filter(&record.raw_line))
            .unwrap_or(false);
        let reason = keyword_matched.then_some(Reason::Keyword);
        if out.send((record, reason)).await.is_err() {
            return;
        }
    }
}

async fn anomaly_stage(
    mut rx: mpsc::Receiver<Staged>,
    out: mpsc::Sender<(LogRecord, Option<Reason>)>,
    events: mpsc::Sender<Event>,
    descriptors: HashMap<SourceId, SourceDescriptor>,
    config: AnomalyConfig,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut detector = AnomalyDetector::new(config);
    let mut stall_tick = tokio::time::interval(STALL_CHECK_INTERVAL);

    loop {
        tokio::select! {
            _ = shutdown.recv() => return,
            staged = rx.recv() => {
                let Some(staged) = staged else { return };
                let now = Instant::now();
                let Staged { record, baseline_rate } = staged;

                if let Some(spike) = detector.observe_arrival(&record.source_id, baseline_rate, now) {
                    if events.send(spike).await.is_err() {
                        return;
                    }
                }

                let keyword_matched = descriptors
                    .get(&record.source_id)
                    .map(|d| d.passes_keyword_filter(&record.raw_line))
                    .unwrap_or(false);
                let fp = fingerprint(record.message_portion());
                let level = record.level().map(|l| l.to_string());
                let novel = detector.observe_novelty(
                    &record.source_id,
                    &fp,
                    level.as_deref(),
                    &record.raw_line,
                    keyword_matched,
                );

                let reason = if keyword_matched {
                    Some(Reason::Keyword)
                } else if novel {
                    Some(Reason::Novelty)
                } else {
                    None
                };

                if out.send((record, reason)).await.is_err() {
                    return;
                }
            }
            _ = stall_tick.tick() => {
                for event in detector.check_stalls(Instant::now()) {
                    if events.send(event).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

async fn progress_stage(
    mut rx: mpsc::Receiver<(LogRecord, Option<Reason>)>,
    out: mpsc::Sender<Candidate>,
    events: mpsc::Sender<Event>,
    snapshot: Arc<std::sync::Mutex<ProgressSnapshot>>,
    stages: Vec<Stage>,
    process_name: String,
    terminal_pattern: Option<String>,
    expected_duration_override_secs: Option<f64>,
    descriptors: HashMap<SourceId, SourceDescriptor>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut history = HistoryStore::load_default();
    let started_at = Instant::now();
    let mut tracker = ProgressTracker::new(process_name, stages, &history, started_at, expected_duration_override_secs);
    let terminal_re = terminal_pattern.as_deref().and_then(|p| Regex::new(p).ok());
    let mut observed: u64 = 0;

    loop {
        let (record, reason) = tokio::select! {
            _ = shutdown.recv() => return,
            next = rx.recv() => match next {
                Some(pair) => pair,
                None => return,
            },
        };
        let now = Instant::now();
        observed += 1;
        for event in tracker.observe(&record.source_id, record.seq, &record.raw_line, now) {
            if events.send(event).await.is_err() {
                return;
            }
        }

        // "PID exited 0" (§4.7): the PID watcher's synthetic "process
        // stopped" record is the only signal available since it doesn't
        // carry an exit status today.
        let is_pid_stop = descriptors.get(&record.source_id).map(|d| d.kind) == Some(SourceKind::Pid)
            && record.raw_line.contains("process stopped");
        let is_terminal = is_pid_stop
            || terminal_re.as_ref().map(|re| re.is_match(&record.raw_line)).unwrap_or(false);
        if is_terminal {
            let event = tracker.complete(&record.source_id, record.seq, &mut history, now);
            if events.send(event).await.is_err() {
                return;
            }
        }

        if let Ok(mut snap) = snapshot.lock() {
            snap.fraction = tracker.state().fraction;
            snap.active_stage = tracker
                .state()
                .active_stage_index()
                .map(|i| tracker.state().stages[i].name.clone());
            let elapsed = now.saturating_duration_since(started_at).as_secs_f64();
            snap.rate_per_sec = if elapsed > 0.0 { observed as f64 / elapsed } else { 0.0 };
        }

        if let Some(reason) = reason {
            if out.send(Candidate { record, reason }).await.is_err() {
                return;
            }
        }
    }
}

async fn classifier_stage<A: Advisor>(
    mut rx: mpsc::Receiver<Candidate>,
    events: mpsc::Sender<Event>,
    advisor: Option<A>,
    config: ClassifierConfig,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut classifier = Classifier::new(AnalysisCache::default(), advisor, config);
    let mut quota_tick = tokio::time::interval(QUOTA_REFRESH_INTERVAL);

    loop {
        tokio::select! {
            _ = shutdown.recv() => return,
            candidate = rx.recv() => {
                let Some(candidate) = candidate else { return };
                let now = Instant::now();
                let event = classifier.decide(&candidate.record, candidate.reason, now).await;
                if events.send(event).await.is_err() {
                    return;
                }
            }
            _ = quota_tick.tick() => {
                classifier.refresh_quota(Instant::now()).await;
            }
        }
    }
}

async fn supervise<T: Transport>(
    mut events: mpsc::Receiver<Event>,
    dispatcher: Arc<AsyncMutex<Dispatcher<T>>>,
    transport: T,
    snapshot: Arc<std::sync::Mutex<ProgressSnapshot>>,
    recent_lines: Arc<std::sync::Mutex<RecentLines>>,
    started_at: Instant,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut inbound_tick = tokio::time::interval(INBOUND_POLL_INTERVAL);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                dispatcher.lock().await.dispatch(event, Instant::now()).await;
            }
            _ = inbound_tick.tick() => {
                if let Some(inbound) = transport.poll_inbound().await {
                    handle_command(
                        &inbound.text,
                        &dispatcher,
                        &transport,
                        &snapshot,
                        &recent_lines,
                        started_at,
                    )
                    .await;
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}

async fn handle_command<T: Transport>(
    text: &str,
    dispatcher: &Arc<AsyncMutex<Dispatcher<T>>>,
    transport: &T,
    snapshot: &Arc<std::sync::Mutex<ProgressSnapshot>>,
    recent_lines: &Arc<std::sync::Mutex<RecentLines>>,
    started_at: Instant,
) {
    match Command::parse(text) {
        Command::Pause => dispatcher.lock().await.pause(),
        Command::Resume => dispatcher.lock().await.resume().await,
        Command::Status => {
            let mut guard = dispatcher.lock().await;
            let (fraction, active_stage, rate_per_sec) = snapshot
                .lock()
                .map(|s| (s.fraction, s.active_stage.clone(), s.rate_per_sec))
                .unwrap_or((0.0, None, 0.0));
            let status = StatusSnapshot {
                fraction,
                active_stage,
                rate_per_sec,
                uptime: started_at.elapsed(),
                paused: guard.is_paused(),
                last_event_summary: guard.last_event().map(|e| e.summary.clone()),
            };
            drop(guard);
            let _ = transport.send(&status.format()).await;
        }
        Command::Logs => {
            let reply = recent_lines.lock().map(|r| r.logs_reply()).unwrap_or_default();
            let _ = transport.send(&reply).await;
        }
        Command::Unknown => {}
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
