//! Voxrelay Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! upload validation shared across all Voxrelay components.

pub mod config;
pub mod error;
pub mod models;
pub mod validator;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    FileMetadata, MediaKind, NotificationMeta, SubtitleRecord, TranscribeResponse,
    TranscriptResult,
};
pub use validator::{UploadValidator, ValidationError};
