//! Service layer: file hosting, transcription, notifications, media
//! conversion, and background maintenance tasks.

pub mod cleanup;
pub mod hosting;
pub mod media;
pub mod monitor;
pub mod notify;
pub mod transcribe;

pub use cleanup::CleanupService;
pub use hosting::{CatboxTarget, FileHoster, TempShTarget, TransferShTarget, UploadTarget};
pub use media::AudioExtractor;
pub use monitor::{ProcessingGuard, ResourceMonitor, ResourceStats};
pub use notify::{format_notification, Notifier, NotifierConfig, RateLimitSlot, RateLimiter};
pub use transcribe::{TranscriberConfig, TranscriptionClient};
