//! Domain layer for rask-log-core.
//!
//! Contains the vocabulary shared across all modules:
//! - `LogLevel`: record severity (Debug/Info/Warn/Error/Fatal)
//! - `RotationGranularity`: bucket cadence (monthly/weekly/daily/hourly)
//! - `BucketKey`: the resolved bucket identifier
//! - `CoreError`: invalid level / invalid policy conditions

pub mod bucket_key;
pub mod error;
pub mod granularity;
pub mod log_level;

pub use bucket_key::BucketKey;
pub use error::CoreError;
pub use granularity::RotationGranularity;
pub use log_level::LogLevel;
