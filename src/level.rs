//! Level classification: rank, display name, icon glyph and threshold filter.
//!
//! Everything here is a pure function over `LogLevel`. The raw-code variants
//! exist for callers holding an integer severity they have not validated yet.

use crate::domain::{CoreError, LogLevel};
use serde::{Deserialize, Serialize};

/// Display names in rank order.
pub const LEVEL_NAMES: [&str; 5] = ["DEBUG", "INFO", "WARN", "ERROR", "FATAL"];

/// Icon glyphs, aligned index-for-index with `LEVEL_NAMES`.
pub const LEVEL_ICONS: [&str; 5] = ["🟩", "🟦", "🟨", "🟥", "❌"];

// Both tables are indexed by the variant's own discriminant.
const _: () = assert!(LEVEL_NAMES.len() == LogLevel::ALL.len());
const _: () = assert!(LEVEL_ICONS.len() == LogLevel::ALL.len());

#[inline]
pub const fn rank(level: LogLevel) -> usize {
    level.ordinal()
}

#[inline]
pub const fn name(level: LogLevel) -> &'static str {
    LEVEL_NAMES[level.ordinal()]
}

#[inline]
pub const fn icon(level: LogLevel) -> &'static str {
    LEVEL_ICONS[level.ordinal()]
}

/// The only filtering rule: a record passes when it ranks at or above the threshold.
#[inline]
pub const fn passes(level: LogLevel, threshold: LogLevel) -> bool {
    rank(level) >= rank(threshold)
}

pub fn rank_of(code: i64) -> Result<usize, CoreError> {
    LogLevel::from_code(code).map(rank)
}

pub fn name_of(code: i64) -> Result<&'static str, CoreError> {
    LogLevel::from_code(code).map(name)
}

pub fn icon_of(code: i64) -> Result<&'static str, CoreError> {
    LogLevel::from_code(code).map(icon)
}

pub fn passes_code(code: i64, threshold: LogLevel) -> Result<bool, CoreError> {
    LogLevel::from_code(code).map(|level| passes(level, threshold))
}

/// What a caller does with a record whose severity code is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidLevelPolicy {
    /// Emit the record anyway so unexpected severities are never lost.
    #[default]
    FailOpen,
    /// Drop the record.
    FailClosed,
}

impl InvalidLevelPolicy {
    pub fn from_fail_open(fail_open: bool) -> Self {
        if fail_open {
            InvalidLevelPolicy::FailOpen
        } else {
            InvalidLevelPolicy::FailClosed
        }
    }

    /// Resolve a classification result into an emit/suppress decision.
    pub fn resolve(self, result: Result<bool, CoreError>) -> bool {
        match result {
            Ok(decision) => decision,
            Err(_) => self == InvalidLevelPolicy::FailOpen,
        }
    }
}

/// Rendering and filtering facts about one severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub level: LogLevel,
    pub rank: usize,
    pub name: &'static str,
    pub icon: &'static str,
}

/// Stateless handle over the classification functions.
///
/// Zero-sized; it exists so the facade can hold "the classifier" as a value
/// and so the operations read naturally at call sites.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelClassifier;

impl LevelClassifier {
    pub const fn new() -> Self {
        Self
    }

    pub fn rank(&self, level: LogLevel) -> usize {
        rank(level)
    }

    pub fn name(&self, level: LogLevel) -> &'static str {
        name(level)
    }

    pub fn icon(&self, level: LogLevel) -> &'static str {
        icon(level)
    }

    pub fn passes(&self, level: LogLevel, threshold: LogLevel) -> bool {
        passes(level, threshold)
    }

    pub fn classify(&self, level: LogLevel) -> LevelInfo {
        LevelInfo {
            level,
            rank: rank(level),
            name: name(level),
            icon: icon(level),
        }
    }

    pub fn classify_code(&self, code: i64) -> Result<LevelInfo, CoreError> {
        LogLevel::from_code(code).map(|level| self.classify(level))
    }
}
