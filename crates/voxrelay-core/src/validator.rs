//! Upload validation
//!
//! Extension and size checks applied to every upload before any disk or
//! network activity happens.

use std::path::Path;

use crate::models::MediaKind;

/// Validation errors for uploaded files
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Unsupported file extension: {extension} (allowed: {allowed:?})")]
    UnsupportedExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,
}

/// Upload validator
///
/// Checks uploads against the configured size ceiling and the audio/video
/// extension allow-lists, and decides which pipeline a file takes.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
    audio_extensions: Vec<String>,
    video_extensions: Vec<String>,
}

impl UploadValidator {
    pub fn new(
        max_file_size: usize,
        audio_extensions: Vec<String>,
        video_extensions: Vec<String>,
    ) -> Self {
        Self {
            max_file_size,
            audio_extensions,
            video_extensions,
        }
    }

    /// Validate file size
    pub fn validate_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Decide whether a filename names an audio or a video upload, rejecting
    /// anything outside both allow-lists.
    pub fn classify(&self, filename: &str) -> Result<MediaKind, ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))?;

        if self.audio_extensions.contains(&extension) {
            return Ok(MediaKind::Audio);
        }

        if self.video_extensions.contains(&extension) {
            return Ok(MediaKind::Video);
        }

        Err(ValidationError::UnsupportedExtension {
            extension,
            allowed: self
                .audio_extensions
                .iter()
                .chain(self.video_extensions.iter())
                .cloned()
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_validator() -> UploadValidator {
        UploadValidator::new(
            1024 * 1024, // 1MB
            vec!["mp3".to_string(), "wav".to_string()],
            vec!["mp4".to_string(), "mov".to_string()],
        )
    }

    #[test]
    fn test_validate_size_ok() {
        let validator = test_validator();
        assert!(validator.validate_size(512 * 1024).is_ok());
    }

    #[test]
    fn test_validate_size_too_large() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_size(2 * 1024 * 1024),
            Err(ValidationError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_size_empty() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_size(0),
            Err(ValidationError::EmptyFile)
        ));
    }

    #[test]
    fn test_classify_audio() {
        let validator = test_validator();
        assert_eq!(validator.classify("voice.mp3").unwrap(), MediaKind::Audio);
        assert_eq!(validator.classify("voice.WAV").unwrap(), MediaKind::Audio); // case insensitive
    }

    #[test]
    fn test_classify_video() {
        let validator = test_validator();
        assert_eq!(validator.classify("clip.mp4").unwrap(), MediaKind::Video);
        assert_eq!(validator.classify("clip.MOV").unwrap(), MediaKind::Video);
    }

    #[test]
    fn test_classify_rejects_executable() {
        let validator = test_validator();
        assert!(matches!(
            validator.classify("malware.exe"),
            Err(ValidationError::UnsupportedExtension { .. })
        ));
    }

    #[test]
    fn test_classify_rejects_missing_extension() {
        let validator = test_validator();
        assert!(matches!(
            validator.classify("noextension"),
            Err(ValidationError::InvalidFilename(_))
        ));
    }

    #[test]
    fn test_unsupported_extension_lists_both_allow_lists() {
        let validator = test_validator();
        match validator.classify("notes.txt") {
            Err(ValidationError::UnsupportedExtension { allowed, .. }) => {
                assert!(allowed.contains(&"mp3".to_string()));
                assert!(allowed.contains(&"mp4".to_string()));
            }
            other => panic!("expected UnsupportedExtension, got {:?}", other),
        }
    }
}
