use super::error::CoreError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Severity of a log record, ordered `Debug < Info < Warn < Error < Fatal`.
///
/// The discriminants are the persisted integer codes and double as the index
/// into the classifier's name and icon tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Fatal = 4,
}

impl LogLevel {
    /// Every severity in rank order.
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    #[inline]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// Resolve a raw integer tag. Anything outside `0..=4` is `InvalidLevel`.
    pub fn from_code(code: i64) -> Result<Self, CoreError> {
        match code {
            0 => Ok(LogLevel::Debug),
            1 => Ok(LogLevel::Info),
            2 => Ok(LogLevel::Warn),
            3 => Ok(LogLevel::Error),
            4 => Ok(LogLevel::Fatal),
            _ => Err(CoreError::InvalidLevel(code)),
        }
    }

    pub const fn code(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for LogLevel {
    type Error = CoreError;

    fn try_from(code: i64) -> Result<Self, CoreError> {
        LogLevel::from_code(code)
    }
}

impl FromStr for LogLevel {
    type Err = CoreError;

    /// Accepts display names case-insensitively (`warning` too) and bare codes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i64>() {
            return LogLevel::from_code(code);
        }
        match trimmed.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "fatal" => Ok(LogLevel::Fatal),
            _ => Err(CoreError::UnknownLevelName(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::level::name(*self))
    }
}

impl Serialize for LogLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(crate::level::name(*self))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LevelRepr {
    Code(i64),
    Name(String),
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match LevelRepr::deserialize(deserializer)? {
            LevelRepr::Code(code) => LogLevel::from_code(code),
            LevelRepr::Name(name) => name.parse(),
        }
        .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_round_trips_every_level() {
        for level in LogLevel::ALL {
            assert_eq!(LogLevel::from_code(level.code()).unwrap(), level);
        }
    }

    #[test]
    fn test_from_code_rejects_out_of_range() {
        assert_eq!(LogLevel::from_code(5), Err(CoreError::InvalidLevel(5)));
        assert_eq!(LogLevel::from_code(-1), Err(CoreError::InvalidLevel(-1)));
        assert!(LogLevel::try_from(i64::MAX).is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("Warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(" error ".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert_eq!("4".parse::<LogLevel>().unwrap(), LogLevel::Fatal);

        assert_eq!(
            "trace".parse::<LogLevel>(),
            Err(CoreError::UnknownLevelName("trace".into()))
        );
        assert_eq!("9".parse::<LogLevel>(), Err(CoreError::InvalidLevel(9)));
    }

    #[test]
    fn test_display_uses_table_name() {
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
        assert_eq!(LogLevel::Fatal.to_string(), "FATAL");
    }

    #[test]
    fn test_serde_accepts_names_and_codes() {
        let json = serde_json::to_string(&LogLevel::Error).unwrap();
        assert_eq!(json, "\"ERROR\"");

        let from_name: LogLevel = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(from_name, LogLevel::Warn);

        let from_code: LogLevel = serde_json::from_str("1").unwrap();
        assert_eq!(from_code, LogLevel::Info);

        assert!(serde_json::from_str::<LogLevel>("42").is_err());
        assert!(serde_json::from_str::<LogLevel>("\"verbose\"").is_err());
    }

    #[test]
    fn test_try_from_integer_code() {
        assert_eq!(LogLevel::try_from(3_i64), Ok(LogLevel::Error));
        assert_eq!(LogLevel::try_from(5_i64), Err(CoreError::InvalidLevel(5)));
    }
}
