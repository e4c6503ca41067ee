//! Test helpers: build the router against mock upstreams.
//!
//! Run from workspace root: `cargo test -p voxrelay-api --test transcriptions_test`
//! or `cargo test -p voxrelay-api`.

#![allow(dead_code)]

use axum_test::TestServer;
use mockito::ServerGuard;
use std::path::PathBuf;
use tempfile::TempDir;
use voxrelay_api::setup;
use voxrelay_core::Config;

/// Test application: server plus the mock upstreams and temp dir it owns.
pub struct TestApp {
    pub server: TestServer,
    pub catbox: ServerGuard,
    pub subtitle: ServerGuard,
    pub webhook: Option<ServerGuard>,
    pub upload_dir: TempDir,
}

impl TestApp {
    /// Files currently sitting in the upload directory.
    pub fn upload_dir_entries(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.upload_dir.path())
            .map(|entries| entries.filter_map(|e| e.ok().map(|e| e.path())).collect())
            .unwrap_or_default()
    }
}

/// Setup a test app wired to fresh mock servers, without a webhook.
pub async fn setup_test_app() -> TestApp {
    build_app(false, |_| {}).await
}

/// Setup a test app with a mock webhook server configured.
pub async fn setup_test_app_with_webhook() -> TestApp {
    build_app(true, |_| {}).await
}

/// Setup a test app after applying a config override.
pub async fn setup_test_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    build_app(false, customize).await
}

async fn build_app(with_webhook: bool, customize: impl FnOnce(&mut Config)) -> TestApp {
    let catbox = mockito::Server::new_async().await;
    let subtitle = mockito::Server::new_async().await;
    let webhook = if with_webhook {
        Some(mockito::Server::new_async().await)
    } else {
        None
    };
    let upload_dir = TempDir::new().expect("Failed to create temp upload dir");

    let mut config = test_config(
        upload_dir.path().to_path_buf(),
        catbox.url(),
        subtitle.url(),
        webhook.as_ref().map(|s| s.url()),
    );
    customize(&mut config);

    let state = setup::build_state(config).expect("Failed to build state");
    let router = setup::build_router(state).expect("Failed to build router");
    let server =
        TestServer::new(router.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        catbox,
        subtitle,
        webhook,
        upload_dir,
    }
}

/// Half a MiB of fake mp3 bytes; serializes to a file_size of exactly 0.5.
pub fn mp3_bytes() -> Vec<u8> {
    let mut data = b"ID3".to_vec();
    data.resize(512 * 1024, 0);
    data
}

fn test_config(
    upload_dir: PathBuf,
    catbox_base_url: String,
    transcribe_base_url: String,
    webhook_url: Option<String>,
) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        environment: "test".to_string(),
        upload_dir,
        max_upload_size_bytes: 1024 * 1024,
        audio_extensions: vec![
            "mp3".to_string(),
            "m4a".to_string(),
            "wav".to_string(),
            "ogg".to_string(),
        ],
        video_extensions: vec![
            "mp4".to_string(),
            "mov".to_string(),
            "avi".to_string(),
            "mkv".to_string(),
        ],
        ffmpeg_path: "ffmpeg".to_string(),
        upload_targets: vec!["catbox".to_string()],
        catbox_base_url,
        transfersh_base_url: "http://transfersh.invalid".to_string(),
        tempsh_base_url: "http://tempsh.invalid".to_string(),
        hosting_timeout_secs: 5,
        transcribe_base_url,
        transcribe_token: "test-token".to_string(),
        transcribe_timeout_secs: 5,
        max_retries: 0,
        retry_delay_secs: 0,
        webhook_url,
        webhook_timeout_secs: 5,
        messages_per_minute: 600,
        cleanup_interval_secs: 3600,
        max_file_age_secs: 3600,
        monitor_interval_secs: 2,
        max_cpu_usage_percent: 80.0,
        max_memory_usage_percent: 80.0,
    }
}
