// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine crate.

use thiserror::Error;

/// Errors raised by the pipeline and its stages, distinct from the
/// per-record parse errors that `telewatch-core::RecordParseError` covers
/// (those are counted and skipped, never surfaced as an `EngineError`).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("history file at {path} is corrupt: {source}")]
    HistoryCorrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write history file at {path}: {source}")]
    HistoryWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no source adapters configured")]
    NoSources,
}
