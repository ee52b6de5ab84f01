use crate::domain::{LogLevel, RotationGranularity};
use crate::level::InvalidLevelPolicy;
use crate::logger::LoggerState;
use crate::rotation::{RotationPolicy, WeekNumbering};
use clap::{ArgAction, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Argument error: {0}")]
    ArgError(#[from] clap::Error),
}

/// Verbosity of the crate's own diagnostics (tracing), not of the records it writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<TracingLevel> for tracing::Level {
    fn from(level: TracingLevel) -> Self {
        match level {
            TracingLevel::Error => tracing::Level::ERROR,
            TracingLevel::Warn => tracing::Level::WARN,
            TracingLevel::Info => tracing::Level::INFO,
            TracingLevel::Debug => tracing::Level::DEBUG,
            TracingLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
#[serde(default)]
pub struct Config {
    /// Directory bucket files are written to
    #[arg(long, env = "RASK_LOG_DIR", default_value = "./logs")]
    pub log_dir: PathBuf,

    /// Base file name; buckets are named `{base}_{key}.log`
    #[arg(long, env = "RASK_LOG_BASE", default_value = "app")]
    pub base_name: String,

    /// Minimum severity written (name or code 0-4)
    #[arg(long, env = "RASK_LOG_THRESHOLD", default_value = "info")]
    pub threshold: LogLevel,

    /// Bucket cadence: yyyy_MM, yyyy_ww, yyyy_MM_dd, yyyy_MM_dd_HH (or code 0-3)
    #[arg(long, env = "RASK_LOG_GRANULARITY", default_value = "yyyy_MM_dd")]
    pub granularity: RotationGranularity,

    /// Week numbering for weekly buckets: iso, sunday, monday
    #[arg(long, env = "RASK_LOG_WEEK_NUMBERING", default_value = "iso")]
    pub week_numbering: WeekNumbering,

    /// Emit records whose severity code is unknown
    #[arg(
        long,
        env = "RASK_LOG_FAIL_OPEN",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub fail_open: bool,

    /// Keep only this many newest buckets (unset keeps everything)
    #[arg(long, env = "RASK_LOG_KEEP_BUCKETS")]
    pub keep_buckets: Option<usize>,

    /// Seconds between retention passes
    #[arg(long, env = "RASK_LOG_RETENTION_INTERVAL_SECS", default_value = "300")]
    pub retention_interval_secs: u64,

    /// Diagnostics verbosity
    #[arg(long, env = "RUST_LOG_LEVEL", default_value = "info")]
    pub diagnostics: TracingLevel,

    /// Configuration file path (optional, TOML)
    #[arg(long, env = "CONFIG_FILE")]
    #[serde(skip)]
    pub config_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("./logs"),
            base_name: "app".to_string(),
            threshold: LogLevel::Info,
            granularity: RotationGranularity::DailyInMonth,
            week_numbering: WeekNumbering::Iso,
            fail_open: true,
            keep_buckets: None,
            retention_interval_secs: 300,
            diagnostics: TracingLevel::Info,
            config_file: None,
        }
    }
}

impl Config {
    /// Parse CLI args (env vars included); a `--config-file` replaces them wholesale.
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config = Config::try_parse_from(args)?;
        if let Some(config_file) = &config.config_file {
            return Self::from_file(config_file);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Config = toml::from_str(&content)?;
        config.config_file = Some(path.as_ref().to_path_buf());
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_name.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "Base name must not be empty".to_string(),
            ));
        }

        if self.base_name.contains(['/', '\\']) {
            return Err(ConfigError::InvalidConfig(format!(
                "Base name '{}' must not contain path separators",
                self.base_name
            )));
        }

        if self.keep_buckets == Some(0) {
            return Err(ConfigError::InvalidConfig(
                "Keep buckets must be greater than 0".to_string(),
            ));
        }

        if self.keep_buckets.is_some() && self.retention_interval_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "Retention interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::new(self.granularity).with_week_numbering(self.week_numbering)
    }

    pub fn logger_state(&self) -> LoggerState {
        LoggerState {
            threshold: self.threshold,
            invalid_level_policy: InvalidLevelPolicy::from_fail_open(self.fail_open),
        }
    }

    pub fn retention_interval(&self) -> Duration {
        Duration::from_secs(self.retention_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.granularity, RotationGranularity::DailyInMonth);
        assert_eq!(config.threshold, LogLevel::Info);
        assert!(config.fail_open);
    }

    #[test]
    fn test_validate_empty_base_name_fails() {
        let config = Config {
            base_name: "  ".to_string(),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Base name must not be empty"));
    }

    #[test]
    fn test_validate_base_name_with_separator_fails() {
        let config = Config {
            base_name: "logs/app".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_keep_buckets_fails() {
        let config = Config {
            keep_buckets: Some(0),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Keep buckets must be greater than 0"));
    }

    #[test]
    fn test_logger_state_maps_fail_open() {
        let config = Config {
            fail_open: false,
            threshold: LogLevel::Error,
            ..Config::default()
        };
        let state = config.logger_state();
        assert_eq!(state.threshold, LogLevel::Error);
        assert_eq!(state.invalid_level_policy, InvalidLevelPolicy::FailClosed);
    }

    #[test]
    fn test_rotation_policy_carries_week_numbering() {
        let config = Config {
            granularity: RotationGranularity::Weekly,
            week_numbering: WeekNumbering::Sunday,
            ..Config::default()
        };
        let policy = config.rotation_policy();
        assert_eq!(policy.granularity, RotationGranularity::Weekly);
        assert_eq!(policy.week_numbering, WeekNumbering::Sunday);
    }

    #[test]
    fn test_tracing_level_conversion() {
        assert_eq!(tracing::Level::from(TracingLevel::Trace), tracing::Level::TRACE);
        assert_eq!(tracing::Level::from(TracingLevel::Warn), tracing::Level::WARN);
    }
}
