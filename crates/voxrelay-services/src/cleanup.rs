//! Periodic removal of stale files from the upload directory.
//!
//! Uploads and extracted audio are deleted at the end of each request, but
//! crashes and aborted requests leave strays behind. The sweep catches those.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;

use voxrelay_core::Config;

#[derive(Clone)]
pub struct CleanupService {
    upload_dir: PathBuf,
    max_age: Duration,
    sweep_interval: Duration,
}

impl CleanupService {
    pub fn new(upload_dir: PathBuf, max_age: Duration, sweep_interval: Duration) -> Self {
        Self {
            upload_dir,
            max_age,
            sweep_interval,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.upload_dir.clone(),
            Duration::from_secs(config.max_file_age_secs),
            Duration::from_secs(config.cleanup_interval_secs),
        )
    }

    /// Start the background sweep loop.
    /// Returns a JoinHandle for graceful shutdown.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(self.sweep_interval);

            loop {
                sweep_interval.tick().await;

                match self.sweep().await {
                    Ok(removed) => {
                        tracing::info!(removed, "Upload directory sweep complete");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Upload directory sweep failed");
                    }
                }
            }
        })
    }

    /// Removes regular files older than `max_age`; returns how many went away.
    #[tracing::instrument(skip(self), fields(dir = %self.upload_dir.display()))]
    pub async fn sweep(&self) -> Result<usize, anyhow::Error> {
        let mut entries = tokio::fs::read_dir(&self.upload_dir).await?;
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| modified.elapsed().ok());
            let expired = match age {
                Some(age) => age > self.max_age,
                // mtime in the future (clock skew); leave the file alone
                None => false,
            };

            if expired {
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => {
                        tracing::debug!(path = %path.display(), "Removed stale upload");
                        removed += 1;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to remove stale upload"
                        );
                    }
                }
            }
        }

        Ok(removed)
    }
}
