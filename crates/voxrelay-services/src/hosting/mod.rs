//! Public file hosting with ordered failover.
//!
//! Transcription happens by URL, so every upload is first pushed to a
//! public host. Each provider behind [`UploadTarget`] is tried once, in
//! the order configured by `UPLOAD_TARGETS`; the first URL wins.

mod catbox;
mod tempsh;
mod transfersh;

pub use catbox::CatboxTarget;
pub use tempsh::TempShTarget;
pub use transfersh::TransferShTarget;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use voxrelay_core::{AppError, Config};

/// A single public file hosting provider.
#[async_trait]
pub trait UploadTarget: Send + Sync {
    /// Short provider name used in logs and failure summaries.
    fn name(&self) -> &'static str;

    /// Upload the file at `path` and return its public URL.
    async fn upload(&self, path: &Path) -> Result<String>;
}

/// Validates that a provider response body is a URL, not an error page.
pub(crate) fn require_url(target: &str, body: &str) -> Result<String> {
    let url = body.trim();
    if !url.starts_with("http") {
        let preview: String = url.chars().take(120).collect();
        anyhow::bail!("{} returned an unexpected body: {:?}", target, preview);
    }
    Ok(url.to_string())
}

pub(crate) fn file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("Upload path has no usable file name: {}", path.display()))
}

/// Ordered chain of upload targets.
pub struct FileHoster {
    targets: Vec<Arc<dyn UploadTarget>>,
}

impl std::fmt::Debug for FileHoster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileHoster")
            .field(
                "targets",
                &self.targets.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl FileHoster {
    pub fn new(targets: Vec<Arc<dyn UploadTarget>>) -> Self {
        Self { targets }
    }

    /// Builds the failover chain named by `config.upload_targets`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.hosting_timeout_secs);
        let mut targets: Vec<Arc<dyn UploadTarget>> = Vec::new();

        for name in &config.upload_targets {
            let target: Arc<dyn UploadTarget> = match name.as_str() {
                "catbox" => Arc::new(CatboxTarget::new(config.catbox_base_url.clone(), timeout)?),
                "transfersh" => Arc::new(TransferShTarget::new(
                    config.transfersh_base_url.clone(),
                    timeout,
                )?),
                "tempsh" => Arc::new(TempShTarget::new(config.tempsh_base_url.clone(), timeout)?),
                other => anyhow::bail!("Unknown upload target: {}", other),
            };
            targets.push(target);
        }

        Ok(Self::new(targets))
    }

    /// Tries each target once, in order, and returns the first public URL.
    ///
    /// A target failure is logged and the chain moves on; only when every
    /// target has failed does this return an error, carrying the per-target
    /// failure summary.
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn obtain_public_url(&self, path: &Path) -> Result<String, AppError> {
        let mut failures = Vec::new();

        for target in &self.targets {
            match target.upload(path).await {
                Ok(url) => {
                    tracing::info!(target = target.name(), url = %url, "File hosted");
                    return Ok(url);
                }
                Err(e) => {
                    tracing::warn!(
                        target = target.name(),
                        error = %e,
                        "Upload target failed, trying next"
                    );
                    failures.push(format!("{}: {}", target.name(), e));
                }
            }
        }

        Err(AppError::UploadHostsExhausted(failures.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedTarget {
        name: &'static str,
        url: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl ScriptedTarget {
        fn succeeding(name: &'static str, url: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                url: Some(url),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                url: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UploadTarget for ScriptedTarget {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn upload(&self, _path: &Path) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.url {
                Some(url) => Ok(url.to_string()),
                None => Err(anyhow::anyhow!("scripted failure")),
            }
        }
    }

    #[tokio::test]
    async fn first_success_stops_the_chain() {
        let first = ScriptedTarget::failing("first");
        let second = ScriptedTarget::succeeding("second", "https://files.example/abc.mp3");
        let third = ScriptedTarget::succeeding("third", "https://unused.example/x");

        let hoster = FileHoster::new(vec![first.clone(), second.clone(), third.clone()]);
        let url = hoster
            .obtain_public_url(Path::new("/tmp/abc.mp3"))
            .await
            .unwrap();

        assert_eq!(url, "https://files.example/abc.mp3");
        assert_eq!(first.call_count(), 1);
        assert_eq!(second.call_count(), 1);
        assert_eq!(third.call_count(), 0);
    }

    #[tokio::test]
    async fn exhausted_chain_reports_every_failure() {
        let first = ScriptedTarget::failing("first");
        let second = ScriptedTarget::failing("second");

        let hoster = FileHoster::new(vec![first.clone(), second.clone()]);
        let err = hoster
            .obtain_public_url(Path::new("/tmp/abc.mp3"))
            .await
            .unwrap_err();

        match err {
            AppError::UploadHostsExhausted(summary) => {
                assert!(summary.contains("first"));
                assert!(summary.contains("second"));
            }
            other => panic!("expected UploadHostsExhausted, got {:?}", other),
        }
        assert_eq!(first.call_count(), 1);
        assert_eq!(second.call_count(), 1);
    }

    #[tokio::test]
    async fn each_target_is_tried_at_most_once() {
        let only = ScriptedTarget::failing("only");
        let hoster = FileHoster::new(vec![only.clone()]);

        let _ = hoster.obtain_public_url(Path::new("/tmp/abc.mp3")).await;
        assert_eq!(only.call_count(), 1);
    }

    #[test]
    fn require_url_trims_and_accepts_http() {
        let url = require_url("test", "  https://host/file.mp3\n").unwrap();
        assert_eq!(url, "https://host/file.mp3");
    }

    #[test]
    fn require_url_rejects_error_pages() {
        let err = require_url("test", "<html>414 Request-URI Too Large</html>").unwrap_err();
        assert!(err.to_string().contains("test"));
    }

    #[test]
    fn from_config_rejects_unknown_target() {
        let config = Config {
            upload_targets: vec!["catbox".to_string(), "imgur".to_string()],
            ..test_config()
        };
        let err = FileHoster::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("imgur"));
    }

    #[test]
    fn from_config_builds_the_full_chain() {
        let hoster = FileHoster::from_config(&test_config()).unwrap();
        assert_eq!(hoster.targets.len(), 3);
        assert_eq!(hoster.targets[0].name(), "catbox");
        assert_eq!(hoster.targets[1].name(), "transfersh");
        assert_eq!(hoster.targets[2].name(), "tempsh");
    }

    fn test_config() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            upload_dir: std::path::PathBuf::from("/tmp/voxrelay-test"),
            max_upload_size_bytes: 32 * 1024 * 1024,
            audio_extensions: vec!["mp3".to_string()],
            video_extensions: vec!["mp4".to_string()],
            ffmpeg_path: "ffmpeg".to_string(),
            upload_targets: vec![
                "catbox".to_string(),
                "transfersh".to_string(),
                "tempsh".to_string(),
            ],
            catbox_base_url: "https://catbox.moe".to_string(),
            transfersh_base_url: "https://transfer.sh".to_string(),
            tempsh_base_url: "https://temp.sh".to_string(),
            hosting_timeout_secs: 5,
            transcribe_base_url: "https://transcribe.example".to_string(),
            transcribe_token: "test-token".to_string(),
            transcribe_timeout_secs: 5,
            max_retries: 1,
            retry_delay_secs: 0,
            webhook_url: None,
            webhook_timeout_secs: 5,
            messages_per_minute: 20,
            cleanup_interval_secs: 3600,
            max_file_age_secs: 3600,
            monitor_interval_secs: 2,
            max_cpu_usage_percent: 80.0,
            max_memory_usage_percent: 80.0,
        }
    }
}
