// Append log lines to one file per time bucket.
// The bucket key comes from the rotation policy; when a write lands in a new
// bucket the current file is flushed and synced, and the next one is opened in
// append mode so a restarted process keeps filling the same bucket.

use super::error::WriterError;
use crate::domain::BucketKey;
use crate::rotation::RotationPolicy;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const LOG_EXTENSION: &str = "log";

/// Rotation state: the writer either has no bucket yet or owns exactly one
/// open bucket file.
enum BucketState {
    NoBucketOpen,
    BucketOpen { key: BucketKey, file: File },
}

struct Inner {
    state: BucketState,
    rotations: u64,
}

#[derive(Clone)]
pub struct RollingFileWriter {
    directory: PathBuf,
    base_name: String,
    policy: RotationPolicy,
    // Key lookup, rotation decision and file swap all happen under this lock.
    inner: Arc<Mutex<Inner>>,
}

impl RollingFileWriter {
    pub async fn new(
        directory: impl Into<PathBuf>,
        base_name: &str,
        policy: RotationPolicy,
    ) -> Result<Self, WriterError> {
        validate_base_name(base_name)?;
        let directory = directory.into();

        tokio::fs::create_dir_all(&directory)
            .await
            .map_err(|source| WriterError::Directory {
                path: directory.clone(),
                source,
            })?;

        Ok(Self {
            directory,
            base_name: base_name.to_string(),
            policy,
            inner: Arc::new(Mutex::new(Inner {
                state: BucketState::NoBucketOpen,
                rotations: 0,
            })),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    /// `{directory}/{base}_{key}.log`
    pub fn path_for(&self, key: &BucketKey) -> PathBuf {
        self.directory
            .join(bucket_file_name(&self.base_name, key.as_str()))
    }

    /// Append `line` plus a newline to the bucket `instant` belongs to,
    /// rotating first if the bucket changed. Returns the key written to.
    pub async fn write_line_at(
        &self,
        instant: &NaiveDateTime,
        line: &str,
    ) -> Result<BucketKey, WriterError> {
        let mut guard = self.inner.lock().await;
        let key = self.policy.bucket_key(instant);

        let (key, mut file) = match std::mem::replace(&mut guard.state, BucketState::NoBucketOpen) {
            BucketState::BucketOpen { key: current, file }
                if !self.policy.has_rotated(current.as_str(), instant) =>
            {
                (current, file)
            }
            BucketState::BucketOpen {
                key: old_key,
                file,
            } => {
                self.finish(&old_key, file).await?;
                guard.rotations += 1;
                info!(from = %old_key, to = %key, base = %self.base_name, "Rotating log bucket");
                let file = self.open_bucket(&key).await?;
                (key, file)
            }
            BucketState::NoBucketOpen => {
                let file = self.open_bucket(&key).await?;
                (key, file)
            }
        };

        let written = append_line(&mut file, line)
            .await
            .map_err(|e| WriterError::io(self.path_for(&key), e));
        guard.state = BucketState::BucketOpen {
            key: key.clone(),
            file,
        };
        written.map(|()| key)
    }

    /// Key of the bucket currently open, if any.
    pub async fn current_key(&self) -> Option<BucketKey> {
        match &self.inner.lock().await.state {
            BucketState::NoBucketOpen => None,
            BucketState::BucketOpen { key, .. } => Some(key.clone()),
        }
    }

    /// Number of bucket switches since creation (the first open is not one).
    pub async fn rotations(&self) -> u64 {
        self.inner.lock().await.rotations
    }

    /// Flush and sync the open bucket and return to the no-bucket state.
    pub async fn close(&self) -> Result<(), WriterError> {
        let mut guard = self.inner.lock().await;
        let previous = std::mem::replace(&mut guard.state, BucketState::NoBucketOpen);
        if let BucketState::BucketOpen { key, file } = previous {
            self.finish(&key, file).await?;
        }
        Ok(())
    }

    async fn open_bucket(&self, key: &BucketKey) -> Result<File, WriterError> {
        let path = self.path_for(key);
        debug!(path = %path.display(), "Opening log bucket");
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| WriterError::io(path, e))
    }

    async fn finish(&self, key: &BucketKey, mut file: File) -> Result<(), WriterError> {
        let path = self.path_for(key);
        file.flush().await.map_err(|e| WriterError::io(&path, e))?;
        file.sync_data().await.map_err(|e| WriterError::io(&path, e))?;
        Ok(())
    }
}

async fn append_line(file: &mut File, line: &str) -> std::io::Result<()> {
    file.write_all(line.as_bytes()).await?;
    file.write_all(b"\n").await?;
    file.flush().await
}

pub fn bucket_file_name(base_name: &str, key: &str) -> String {
    format!("{base_name}_{key}.{LOG_EXTENSION}")
}

pub(crate) fn validate_base_name(base_name: &str) -> Result<(), WriterError> {
    if base_name.trim().is_empty() || base_name.contains(['/', '\\']) {
        return Err(WriterError::InvalidBaseName(base_name.to_string()));
    }
    Ok(())
}
