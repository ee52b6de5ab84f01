use thiserror::Error;

/// Conditions signalled by the level classifier and the rotation resolver.
///
/// Both are local and recoverable. The caller decides whether an unknown
/// severity fails open or closed; the core never picks for it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid level code {0}: expected 0..=4 (DEBUG..FATAL)")]
    InvalidLevel(i64),

    #[error("Unknown level name '{0}'")]
    UnknownLevelName(String),

    #[error("Invalid rotation policy code {0}: expected 0..=3 (yyyy_MM..yyyy_MM_dd_HH)")]
    InvalidPolicy(i64),

    #[error("Unknown rotation policy '{0}'")]
    UnknownPolicyName(String),

    #[error("Unknown week numbering '{0}'. Valid values: iso, sunday, monday")]
    UnknownWeekNumbering(String),
}
