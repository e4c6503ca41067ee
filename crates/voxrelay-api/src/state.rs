//! Application state shared across handlers.

use std::sync::Arc;

use voxrelay_core::{Config, UploadValidator};
use voxrelay_services::{AudioExtractor, Notifier, ResourceMonitor, TranscriptionClient};

/// Main application state: the services behind the request pipeline.
///
/// Everything is built once in `setup::build_state` and injected; handlers
/// never construct their own clients.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub validator: UploadValidator,
    pub extractor: Arc<AudioExtractor>,
    pub transcriber: Arc<TranscriptionClient>,
    pub notifier: Arc<Notifier>,
    pub monitor: ResourceMonitor,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
