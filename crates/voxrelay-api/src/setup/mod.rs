//! Application setup and initialization
//!
//! All wiring lives here instead of main.rs. `build_state` and
//! `build_router` are side-effect free so integration tests can run the
//! same router the binary serves against mock upstreams.

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use voxrelay_core::{Config, UploadValidator};
use voxrelay_services::{
    AudioExtractor, CleanupService, FileHoster, Notifier, NotifierConfig, ResourceMonitor,
    TranscriberConfig, TranscriptionClient,
};

pub use routes::build_router;

/// Build the shared application state from configuration.
pub fn build_state(config: Config) -> Result<Arc<AppState>> {
    let validator = UploadValidator::new(
        config.max_upload_size_bytes,
        config.audio_extensions.clone(),
        config.video_extensions.clone(),
    );
    let extractor = Arc::new(AudioExtractor::from_config(&config));
    let hoster = FileHoster::from_config(&config)?;
    let transcriber = Arc::new(TranscriptionClient::new(
        hoster,
        TranscriberConfig::from_config(&config),
    )?);
    let notifier = Arc::new(Notifier::new(NotifierConfig::from_config(&config))?);
    let monitor = ResourceMonitor::from_config(&config);

    Ok(Arc::new(AppState {
        config,
        validator,
        extractor,
        transcriber,
        notifier,
        monitor,
    }))
}

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry();

    tracing::info!(
        environment = %config.environment,
        is_production = config.is_production(),
        "Configuration loaded and validated"
    );

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create upload directory {}",
                config.upload_dir.display()
            )
        })?;

    let state = build_state(config)?;

    spawn_background_tasks(&state);

    let router = routes::build_router(state.clone())?;

    Ok((state, router))
}

/// Spawn the periodic upload-dir sweep and the resource watchdog.
fn spawn_background_tasks(state: &Arc<AppState>) {
    let cleanup = Arc::new(CleanupService::from_config(&state.config));
    cleanup.start();
    tracing::info!(
        interval_secs = state.config.cleanup_interval_secs,
        "Started upload directory cleanup task"
    );

    // The watchdog token is never cancelled; the task runs until the process exits.
    state.monitor.start(
        CancellationToken::new(),
        Duration::from_secs(state.config.monitor_interval_secs),
    );
    tracing::info!(
        interval_secs = state.config.monitor_interval_secs,
        "Started resource monitor task"
    );
}
