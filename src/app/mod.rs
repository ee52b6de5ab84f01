pub mod config;
pub mod diagnostics;

pub use config::{Config, ConfigError, TracingLevel};
pub use diagnostics::init_tracing;

use crate::domain::LogLevel;
use crate::logger::Logger;
use crate::writer::{BucketRetention, RollingFileWriter};
use anyhow::Context;
use std::process;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Severity tag found at the start of an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSeverity {
    Level(LogLevel),
    /// Explicit `LEVEL(<code>)` tag, possibly outside the known range.
    Code(i64),
}

/// Split `"WARN disk low"` / `"2 disk low"` / `"LEVEL(7) odd"` into tag and
/// message. A bare number is a tag only when it is a known level code, so
/// `"404 not found"` stays an untagged line. Lines without a recognised leading
/// tag come back whole with `None`.
pub fn split_severity(line: &str) -> (Option<LineSeverity>, &str) {
    let trimmed = line.trim_start();
    let (token, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim_start()),
        None => (trimmed, ""),
    };

    if let Some(code) = explicit_code(token) {
        return (Some(LineSeverity::Code(code)), rest);
    }
    match token.parse::<LogLevel>() {
        Ok(level) => (Some(LineSeverity::Level(level)), rest),
        Err(_) => (None, line),
    }
}

fn explicit_code(token: &str) -> Option<i64> {
    let inner = token
        .get(..6)
        .filter(|head| head.eq_ignore_ascii_case("LEVEL("))
        .and_then(|_| token[6..].strip_suffix(')'))?;
    inner.parse().ok()
}

pub struct App {
    config: Config,
    logger: Arc<Logger>,
    retention: Option<JoinHandle<()>>,
}

impl App {
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let writer = RollingFileWriter::new(
            config.log_dir.clone(),
            &config.base_name,
            config.rotation_policy(),
        )
        .await
        .context("Failed to create rolling file writer")?;

        let retention = config.keep_buckets.map(|keep| {
            BucketRetention::for_writer(&writer, keep, config.retention_interval()).spawn()
        });

        let logger = Arc::new(Logger::new(writer, config.logger_state()));

        info!("Starting rask-log-core v{}", crate::VERSION);
        info!(
            "Configuration: log_dir={}, base_name={}, granularity={}, threshold={}",
            config.log_dir.display(),
            config.base_name,
            config.granularity,
            config.threshold
        );

        Ok(Self {
            config,
            logger,
            retention,
        })
    }

    pub fn logger(&self) -> Arc<Logger> {
        self.logger.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Forward stdin lines into the logger until EOF.
    pub async fn run_stdin(self) -> anyhow::Result<u64> {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        let mut written = 0u64;

        while let Some(line) = lines.next_line().await? {
            if self.forward_line(&line).await? {
                written += 1;
            }
        }

        self.shutdown().await?;
        info!("stdin closed, {} records written", written);
        Ok(written)
    }

    /// Log one input line at its tagged severity (default: INFO).
    pub async fn forward_line(&self, line: &str) -> anyhow::Result<bool> {
        let emitted = match split_severity(line) {
            (Some(LineSeverity::Level(level)), message) => self.logger.log(level, message).await?,
            (Some(LineSeverity::Code(code)), message) => {
                self.logger.log_code(code, message).await?
            }
            (None, message) => self.logger.log(LogLevel::Info, message).await?,
        };
        Ok(emitted.is_some())
    }

    pub async fn shutdown(&self) -> anyhow::Result<()> {
        if let Some(handle) = &self.retention {
            handle.abort();
        }
        self.logger.close().await?;
        Ok(())
    }
}

// Main entry point for the application
pub async fn main() -> anyhow::Result<()> {
    let config = match Config::from_args(std::env::args()) {
        Ok(config) => config,
        Err(ConfigError::ArgError(e)) => e.exit(),
        Err(e) => {
            eprintln!("Configuration error: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = init_tracing(config.diagnostics) {
        eprintln!("Warning: {e}, continuing without diagnostics");
    }

    let app = App::from_config(config).await?;
    if let Err(e) = app.run_stdin().await {
        error!("Application error: {:#}", e);
        process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_severity_by_name() {
        assert_eq!(
            split_severity("WARN disk low"),
            (Some(LineSeverity::Level(LogLevel::Warn)), "disk low")
        );
        assert_eq!(
            split_severity("  error   boom"),
            (Some(LineSeverity::Level(LogLevel::Error)), "boom")
        );
    }

    #[test]
    fn test_split_severity_by_code() {
        assert_eq!(
            split_severity("4 halt"),
            (Some(LineSeverity::Level(LogLevel::Fatal)), "halt")
        );
        assert_eq!(
            split_severity("LEVEL(12) strange"),
            (Some(LineSeverity::Code(12)), "strange")
        );
        assert_eq!(
            split_severity("level(-1) below"),
            (Some(LineSeverity::Code(-1)), "below")
        );
    }

    #[test]
    fn test_split_severity_leaves_other_numbers_in_message() {
        assert_eq!(
            split_severity("404 not found for /index.html"),
            (None, "404 not found for /index.html")
        );
        assert_eq!(split_severity("200 OK"), (None, "200 OK"));
        assert_eq!(split_severity("LEVEL(x) odd"), (None, "LEVEL(x) odd"));
        assert_eq!(split_severity("LEVEL( odd"), (None, "LEVEL( odd"));
    }

    #[test]
    fn test_split_severity_untagged() {
        assert_eq!(split_severity("hello world"), (None, "hello world"));
        assert_eq!(split_severity(""), (None, ""));
        assert_eq!(
            split_severity("FATAL"),
            (Some(LineSeverity::Level(LogLevel::Fatal)), "")
        );
    }
}
