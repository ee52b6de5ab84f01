#![warn(rust_2018_idioms)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
#![allow(
    clippy::cast_possible_truncation, // Codes are validated before narrowing
    clippy::cast_sign_loss,           // Ordinals are non-negative
    clippy::missing_errors_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. RotationPolicy in rotation module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown
)]

pub mod app;
pub mod domain;
pub mod level;
pub mod logger;
pub mod rotation;
pub mod writer;

// Re-export main types for easy access
pub use domain::{BucketKey, CoreError, LogLevel, RotationGranularity};
pub use level::{InvalidLevelPolicy, LevelClassifier};
pub use logger::{Logger, LoggerState};
pub use rotation::{RotationPolicy, WeekNumbering};
pub use writer::RollingFileWriter;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
