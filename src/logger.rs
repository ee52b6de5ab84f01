//! Logger facade: filters by threshold, renders, and writes to time buckets.
//!
//! The facade owns all mutable logging state (threshold, unknown-severity
//! policy, open bucket) explicitly; nothing here is process-global.

use crate::domain::{BucketKey, LogLevel};
use crate::level::{InvalidLevelPolicy, LevelClassifier};
use crate::writer::{RollingFileWriter, WriterError};
use chrono::{Local, NaiveDateTime};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::warn;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

const UNKNOWN_LEVEL_ICON: &str = "❔";

/// Source of "now" for the facade. The rotation core never reads time itself.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Manually driven clock for tests and replay.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: chrono::TimeDelta) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock()
    }
}

/// Caller-owned filtering state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggerState {
    pub threshold: LogLevel,
    pub invalid_level_policy: InvalidLevelPolicy,
}

impl Default for LoggerState {
    fn default() -> Self {
        Self {
            threshold: LogLevel::Info,
            invalid_level_policy: InvalidLevelPolicy::FailOpen,
        }
    }
}

pub struct Logger {
    classifier: LevelClassifier,
    state: RwLock<LoggerState>,
    writer: RollingFileWriter,
    clock: Arc<dyn Clock>,
}

impl Logger {
    pub fn new(writer: RollingFileWriter, state: LoggerState) -> Self {
        Self::with_clock(writer, state, Arc::new(SystemClock))
    }

    pub fn with_clock(writer: RollingFileWriter, state: LoggerState, clock: Arc<dyn Clock>) -> Self {
        Self {
            classifier: LevelClassifier::new(),
            state: RwLock::new(state),
            writer,
            clock,
        }
    }

    pub fn state(&self) -> LoggerState {
        *self.state.read()
    }

    pub fn set_threshold(&self, threshold: LogLevel) {
        self.state.write().threshold = threshold;
    }

    pub fn set_invalid_level_policy(&self, policy: InvalidLevelPolicy) {
        self.state.write().invalid_level_policy = policy;
    }

    pub fn writer(&self) -> &RollingFileWriter {
        &self.writer
    }

    /// Whether a record at `level` would be emitted right now.
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.classifier.passes(level, self.state.read().threshold)
    }

    /// Emit `message` at `level` if it passes the threshold.
    /// Returns the bucket written to, or `None` when suppressed.
    pub async fn log(
        &self,
        level: LogLevel,
        message: &str,
    ) -> Result<Option<BucketKey>, WriterError> {
        if !self.enabled(level) {
            return Ok(None);
        }
        let info = self.classifier.classify(level);
        self.emit(info.icon, info.name, message).await.map(Some)
    }

    /// Emit with an unvalidated integer severity.
    ///
    /// Unknown codes follow the configured `InvalidLevelPolicy`; when failing
    /// open they are rendered as `LEVEL(<code>)`.
    pub async fn log_code(
        &self,
        code: i64,
        message: &str,
    ) -> Result<Option<BucketKey>, WriterError> {
        match self.classifier.classify_code(code) {
            Ok(info) => self.log(info.level, message).await,
            Err(e) => {
                if self.state.read().invalid_level_policy == InvalidLevelPolicy::FailClosed {
                    return Ok(None);
                }
                warn!(code, error = %e, "Emitting record with unknown severity");
                let name = format!("LEVEL({code})");
                self.emit(UNKNOWN_LEVEL_ICON, &name, message).await.map(Some)
            }
        }
    }

    pub async fn debug(&self, message: &str) -> Result<Option<BucketKey>, WriterError> {
        self.log(LogLevel::Debug, message).await
    }

    pub async fn info(&self, message: &str) -> Result<Option<BucketKey>, WriterError> {
        self.log(LogLevel::Info, message).await
    }

    pub async fn warn(&self, message: &str) -> Result<Option<BucketKey>, WriterError> {
        self.log(LogLevel::Warn, message).await
    }

    pub async fn error(&self, message: &str) -> Result<Option<BucketKey>, WriterError> {
        self.log(LogLevel::Error, message).await
    }

    pub async fn fatal(&self, message: &str) -> Result<Option<BucketKey>, WriterError> {
        self.log(LogLevel::Fatal, message).await
    }

    pub async fn close(&self) -> Result<(), WriterError> {
        self.writer.close().await
    }

    async fn emit(&self, icon: &str, name: &str, message: &str) -> Result<BucketKey, WriterError> {
        let now = self.clock.now();
        let line = format_record(&now, icon, name, message);
        self.writer.write_line_at(&now, &line).await
    }
}

/// `"{timestamp} {icon} [{NAME}] {message}"`
pub fn format_record(instant: &NaiveDateTime, icon: &str, name: &str, message: &str) -> String {
    format!(
        "{} {} [{}] {}",
        instant.format(TIMESTAMP_FORMAT),
        icon,
        name,
        message
    )
}
