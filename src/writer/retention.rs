// BucketRetention: keeps only the newest N bucket files of one base name.
// Bucket keys sort chronologically, so "newest" is decided from file names,
// not from modification times. Only keys shaped like the configured cadence
// take part; the bucket a writer holds open is never removed.

use super::rolling::{LOG_EXTENSION, RollingFileWriter};
use crate::rotation::RotationPolicy;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

pub struct BucketRetention {
    directory: PathBuf,
    base_name: String,
    policy: RotationPolicy,
    keep: usize,
    interval: Duration,
    writer: Option<RollingFileWriter>,
}

impl BucketRetention {
    /// `keep` is clamped to at least one so the active bucket survives.
    pub fn new(
        directory: impl Into<PathBuf>,
        base_name: impl Into<String>,
        policy: RotationPolicy,
        keep: usize,
        interval: Duration,
    ) -> Self {
        Self {
            directory: directory.into(),
            base_name: base_name.into(),
            policy,
            keep: keep.max(1),
            interval,
            writer: None,
        }
    }

    /// Retention over `writer`'s buckets that skips the one it has open.
    pub fn for_writer(writer: &RollingFileWriter, keep: usize, interval: Duration) -> Self {
        Self {
            writer: Some(writer.clone()),
            ..Self::new(
                writer.directory(),
                writer.base_name(),
                writer.policy(),
                keep,
                interval,
            )
        }
    }

    /// Spawn a task that prunes every `interval`, forever.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        loop {
            if let Err(e) = self.prune().await {
                error!("bucket retention error: {}", e);
            }
            sleep(self.interval).await;
        }
    }

    /// Delete all but the newest `keep` buckets of this cadence. Returns the
    /// removed paths.
    pub async fn prune(&self) -> io::Result<Vec<PathBuf>> {
        let buckets: Vec<_> = list_buckets(&self.directory, &self.base_name)
            .await?
            .into_iter()
            .filter(|(key, _)| self.policy.matches_key(key))
            .collect();
        if buckets.len() <= self.keep {
            return Ok(Vec::new());
        }

        let active = match &self.writer {
            Some(writer) => writer.current_key().await,
            None => None,
        };

        let excess = buckets.len() - self.keep;
        info!(
            "{} buckets for '{}' exceed retention of {}, removing {}",
            buckets.len(),
            self.base_name,
            self.keep,
            excess
        );

        let mut removed = Vec::with_capacity(excess);
        for (key, path) in buckets.into_iter().take(excess) {
            if active.as_ref().is_some_and(|open| *open == key.as_str()) {
                debug!("Skipping open bucket {}", key);
                continue;
            }
            match fs::remove_file(&path).await {
                Ok(()) => {
                    warn!("Removed bucket {} ({:?})", key, path);
                    removed.push(path);
                }
                Err(e) => error!("Failed to remove {:?}: {}", path, e),
            }
        }
        Ok(removed)
    }
}

/// Bucket files of `base_name` in `directory`, oldest first, as `(key, path)`.
pub async fn list_buckets(directory: &Path, base_name: &str) -> io::Result<Vec<(String, PathBuf)>> {
    let prefix = format!("{base_name}_");
    let suffix = format!(".{LOG_EXTENSION}");

    let mut dir = fs::read_dir(directory).await?;
    let mut buckets = Vec::new();

    while let Some(entry) = dir.next_entry().await? {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let Some(key) = name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(&suffix))
        else {
            continue;
        };
        if !is_bucket_key(key) || !entry.metadata().await?.is_file() {
            continue;
        }
        buckets.push((key.to_string(), entry.path()));
    }

    buckets.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(buckets)
}

fn is_bucket_key(key: &str) -> bool {
    !key.is_empty()
        && key.starts_with(|c: char| c.is_ascii_digit())
        && key.chars().all(|c| c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RotationGranularity;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    const MINUTE: Duration = Duration::from_secs(60);

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"x\n").unwrap();
    }

    #[test]
    fn test_is_bucket_key() {
        assert!(is_bucket_key("2024-01"));
        assert!(is_bucket_key("2024-01-01-05"));
        assert!(!is_bucket_key(""));
        assert!(!is_bucket_key("-2024"));
        assert!(!is_bucket_key("2024_01"));
        assert!(!is_bucket_key("latest"));
    }

    #[tokio::test]
    async fn test_list_buckets_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "app_2024-03-02.log");
        touch(temp_dir.path(), "app_2024-02-28.log");
        touch(temp_dir.path(), "app_2024-03-01.log");
        touch(temp_dir.path(), "other_2024-01-01.log");
        touch(temp_dir.path(), "app_notes.txt");
        touch(temp_dir.path(), "app_extra_2024-01-01.log");

        let keys: Vec<String> = list_buckets(temp_dir.path(), "app")
            .await
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, vec!["2024-02-28", "2024-03-01", "2024-03-02"]);
    }

    #[tokio::test]
    async fn test_prune_keeps_newest() {
        let temp_dir = TempDir::new().unwrap();
        for day in 1..=5 {
            touch(temp_dir.path(), &format!("app_2024-01-0{day}.log"));
        }

        let retention = BucketRetention::new(
            temp_dir.path(),
            "app",
            RotationPolicy::new(RotationGranularity::DailyInMonth),
            2,
            MINUTE,
        );
        let removed = retention.prune().await.unwrap();
        assert_eq!(removed.len(), 3);

        let remaining: Vec<String> = list_buckets(temp_dir.path(), "app")
            .await
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(remaining, vec!["2024-01-04", "2024-01-05"]);
    }

    #[tokio::test]
    async fn test_prune_keep_zero_is_clamped() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "app_2024-01.log");
        touch(temp_dir.path(), "app_2024-02.log");

        let retention = BucketRetention::new(
            temp_dir.path(),
            "app",
            RotationPolicy::new(RotationGranularity::Monthly),
            0,
            MINUTE,
        );
        retention.prune().await.unwrap();
        assert_eq!(list_buckets(temp_dir.path(), "app").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_prune_ignores_keys_of_other_cadences() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "app_2024-50.log");
        touch(temp_dir.path(), "app_2024-12-19.log");
        touch(temp_dir.path(), "app_2024-12-20.log");

        let retention = BucketRetention::new(
            temp_dir.path(),
            "app",
            RotationPolicy::new(RotationGranularity::DailyInMonth),
            1,
            MINUTE,
        );
        let removed = retention.prune().await.unwrap();
        assert_eq!(removed, vec![temp_dir.path().join("app_2024-12-19.log")]);
        assert!(temp_dir.path().join("app_2024-12-20.log").exists());
        assert!(temp_dir.path().join("app_2024-50.log").exists());
    }

    #[tokio::test]
    async fn test_prune_never_removes_open_bucket() {
        let temp_dir = TempDir::new().unwrap();
        // A leftover weekly key has the same shape as a monthly one and sorts
        // after the live monthly bucket.
        touch(temp_dir.path(), "app_2024-50.log");

        let writer = RollingFileWriter::new(
            temp_dir.path(),
            "app",
            RotationPolicy::new(RotationGranularity::Monthly),
        )
        .await
        .unwrap();
        let instant = NaiveDate::from_ymd_opt(2024, 12, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        writer.write_line_at(&instant, "live").await.unwrap();

        let retention = BucketRetention::for_writer(&writer, 1, MINUTE);
        let removed = retention.prune().await.unwrap();
        assert!(removed.is_empty());

        writer.write_line_at(&instant, "still live").await.unwrap();
        let content = std::fs::read_to_string(temp_dir.path().join("app_2024-12.log")).unwrap();
        assert_eq!(content, "live\nstill live\n");
    }
}
