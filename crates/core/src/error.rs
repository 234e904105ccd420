// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Core-level error types shared by adapters, engine, and daemon crates.

use thiserror::Error;

/// Errors a record parser or format detector can raise on a single line.
///
/// Per §7, a parse error on one record is skipped and counted, never fatal.
#[derive(Debug, Error)]
pub enum RecordParseError {
    #[error("line is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("line did not match any recognized delimiter layout")]
    UnrecognizedDelimiter,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
