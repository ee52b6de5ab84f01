//! Bucket resolution for time-sliced log storage.
//!
//! Pure and clock-free: callers pass the instant in. The writer in
//! `crate::writer` is the only consumer that samples wall time.

pub mod policy;
pub mod week;

pub use policy::{RotationPolicy, bucket_key, bucket_key_for_code, has_rotated};
pub use week::WeekNumbering;
