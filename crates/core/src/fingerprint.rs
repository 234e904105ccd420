// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fingerprint derivation (§4.4).
//!
//! A fingerprint is the canonical form of a record's message portion with
//! volatile substrings replaced by class tokens, so two records that differ
//! only in timestamp, a request ID, or a byte count hash to the same cache
//! key. Derivation is pure: identical input text always yields identical
//! output, independent of wall-clock time (§3 invariants).

use regex::Regex;
use std::sync::OnceLock;

/// Canonicalised form of a record's message, used as cache/novelty key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum fingerprint length (step 9 of the derivation order).
const MAX_FINGERPRINT_LEN: usize = 200;

struct Rule {
    re: &'static Lazy,
    replacement: &'static str,
}

/// Minimal lazily-initialised regex holder (avoids a `once_cell`/`lazy_static` dependency
/// for what is a short, fixed list of patterns).
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
            .get_or_init(|| Regex::new(self.pattern).expect("fingerprint pattern is valid regex"))
    }
}

// Ordered substitution rules, applied in the sequence documented in §4.4.
static TIMESTAMP: Lazy = Lazy::new(
    r"(?x)
      \d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?   # ISO 8601
    | \b\d{10}(?:\.\d+)?\b                                                   # epoch seconds
    | \b\d{13}\b                                                             # epoch millis
    | [A-Z][a-z]{2}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2}                            # RFC 3164
    ",
);
static UUID: Lazy = Lazy::new(
    r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
);
static IPV4: Lazy = Lazy::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b");
static IPV6: Lazy = Lazy::new(r"(?i)\b(?:[0-9a-f]{1,4}:){2,7}[0-9a-f]{1,4}\b");
static HEX: Lazy = Lazy::new(r"(?i)\b[0-9a-f]{6,}\b");
static FLOAT: Lazy = Lazy::new(r"-?\d+\.\d+");
static INTEGER: Lazy = Lazy::new(r"-?\d+");
static PATH: Lazy = Lazy::new(r"(?:/[\w.\-]+)+|[A-Za-z]:\\(?:[\w.\-]+\\?)+");
static WHITESPACE: Lazy = Lazy::new(r"\s+");

fn rules() -> [Rule; 8] {
    [
        Rule {
            re: &TIMESTAMP,
            replacement: "<T>",
        },
        Rule {
            re: &UUID,
            replacement: "<UUID>",
        },
        Rule {
            re: &IPV6,
            replacement: "<IP>",
        },
        Rule {
            re: &IPV4,
            replacement: "<IP>",
        },
        Rule {
            re: &HEX,
            replacement: "<HEX>",
        },
        // Floats are matched before bare integers: a decimal like `3.14` must
        // become a single `<F>` token rather than two `<N>` tokens split by a
        // literal dot.
        Rule {
            re: &FLOAT,
            replacement: "<F>",
        },
        Rule {
            re: &INTEGER,
            replacement: "<N>",
        },
        Rule {
            re: &PATH,
            replacement: "<PATH>",
        },
    ]
}

/// Derive the fingerprint of a record's message portion.
///
/// `message` should already have any profile-known timestamp/level prefix
/// stripped (callers pass [`crate::record::LogRecord::message_portion`]),
/// so this only needs to scrub volatile substrings embedded in the message
/// body itself.
pub fn fingerprint(message: &str) -> Fingerprint {
    let mut s = message.to_string();
    for rule in rules() {
        s = rule.re.get().replace_all(&s, rule.replacement).into_owned();
    }
    s = WHITESPACE.get().replace_all(&s, " ").trim().to_string();
    if s.chars().count() > MAX_FINGERPRINT_LEN {
        s = s.chars().take(MAX_FINGERPRINT_LEN).collect();
    }
    Fingerprint(s)
}

#[cfg(test)]
#[path = "fingerprint_tests.rs"]
mod tests;
