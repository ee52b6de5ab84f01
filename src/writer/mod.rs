//! Bucket-aware file output built on the rotation policy.

pub mod error;
pub mod retention;
pub mod rolling;

pub use error::WriterError;
pub use retention::{BucketRetention, list_buckets};
pub use rolling::{RollingFileWriter, bucket_file_name};
