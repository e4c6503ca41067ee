//! Domain models
//!
//! Subtitle records returned by the transcription API, the assembled
//! transcript, and per-upload file metadata.

use std::path::Path;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One subtitle record as returned by the transcription API.
///
/// Missing timing fields default to zero. Records without text produce no
/// transcript line but still count toward the total duration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubtitleRecord {
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    pub text: Option<String>,
}

/// Assembled transcription output.
#[derive(Debug, Clone)]
pub struct TranscriptResult {
    /// Formatted transcript, one `[<start>s -> <end>s] <text>` line per record.
    pub text: String,
    /// Total duration in minutes, rounded to one decimal place.
    pub duration_minutes: f64,
    /// Raw records as returned by the API.
    pub records: Vec<SubtitleRecord>,
}

impl TranscriptResult {
    /// Build the formatted transcript from raw subtitle records.
    ///
    /// Each record with text becomes one line with both timestamps rendered at
    /// one decimal place. The total duration is the end time of the last
    /// record (with or without text) converted to minutes; an empty record
    /// list is a valid empty transcript, not an error.
    pub fn from_records(records: Vec<SubtitleRecord>) -> Self {
        let lines: Vec<String> = records
            .iter()
            .filter_map(|record| {
                record
                    .text
                    .as_deref()
                    .map(|text| format!("[{:.1}s -> {:.1}s] {}", record.start, record.end, text))
            })
            .collect();

        let duration_minutes = records
            .last()
            .map(|record| round1(record.end / 60.0))
            .unwrap_or(0.0);

        TranscriptResult {
            text: lines.join("\n"),
            duration_minutes,
            records,
        }
    }
}

/// Kind of media accepted by the upload endpoint, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

/// Size and format of an uploaded file, reported back to the caller and
/// echoed in notifications.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// File size in MB, rounded to two decimal places.
    pub size_mb: f64,
    /// Lowercased file extension without the leading dot.
    pub extension: String,
}

impl FileMetadata {
    pub fn new(size_bytes: u64, filename: &str) -> Self {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();

        FileMetadata {
            size_mb: round2(size_bytes as f64 / (1024.0 * 1024.0)),
            extension,
        }
    }
}

/// Optional metadata lines attached to a notification message. Absent fields
/// render as "unknown".
#[derive(Debug, Clone, Default)]
pub struct NotificationMeta {
    pub duration_minutes: Option<f64>,
    pub file_size_mb: Option<f64>,
    pub file_type: Option<String>,
}

/// Response body for a successful transcription request.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TranscribeResponse {
    pub success: bool,
    /// Formatted transcript with one timestamped line per subtitle record.
    pub text: String,
    /// Total duration in minutes, one decimal place.
    pub duration: f64,
    /// Uploaded file size in MB, two decimal places.
    pub file_size: f64,
    /// Uploaded file extension without the leading dot.
    pub file_type: String,
    /// Whether the webhook notification was delivered.
    pub notified: bool,
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(start: f64, end: f64, text: Option<&str>) -> SubtitleRecord {
        SubtitleRecord {
            start,
            end,
            text: text.map(|t| t.to_string()),
        }
    }

    #[test]
    fn test_from_records_formats_lines() {
        let result = TranscriptResult::from_records(vec![
            record(0.0, 5.2, Some("hello")),
            record(5.2, 9.78, Some("world")),
        ]);
        assert_eq!(result.text, "[0.0s -> 5.2s] hello\n[5.2s -> 9.8s] world");
        assert_eq!(result.records.len(), 2);
    }

    #[test]
    fn test_from_records_skips_textless_records_but_counts_duration() {
        let result = TranscriptResult::from_records(vec![
            record(0.0, 5.2, Some("hello")),
            record(5.2, 30.0, None),
        ]);
        assert_eq!(result.text, "[0.0s -> 5.2s] hello");
        assert_eq!(result.duration_minutes, 0.5);
    }

    #[test]
    fn test_from_records_empty_list_is_valid() {
        let result = TranscriptResult::from_records(vec![]);
        assert_eq!(result.text, "");
        assert_eq!(result.duration_minutes, 0.0);
    }

    #[test]
    fn test_duration_is_last_end_in_minutes() {
        let result = TranscriptResult::from_records(vec![record(0.0, 5.2, Some("hello"))]);
        assert_eq!(result.duration_minutes, 0.1);

        let result = TranscriptResult::from_records(vec![
            record(0.0, 60.0, Some("a")),
            record(60.0, 125.0, Some("b")),
        ]);
        assert_eq!(result.duration_minutes, 2.1);
    }

    #[test]
    fn test_timestamps_round_to_one_decimal() {
        let result = TranscriptResult::from_records(vec![record(1.2345, 2.789, Some("x"))]);
        assert_eq!(result.text, "[1.2s -> 2.8s] x");
    }

    #[test]
    fn test_subtitle_record_defaults_missing_times_to_zero() {
        let record: SubtitleRecord = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(record.start, 0.0);
        assert_eq!(record.end, 0.0);
        assert_eq!(record.text.as_deref(), Some("hi"));
    }

    #[test]
    fn test_subtitle_record_ignores_unknown_fields() {
        let record: SubtitleRecord =
            serde_json::from_str(r#"{"start": 1.5, "end": 3.0, "text": "hi", "speaker": 2}"#)
                .unwrap();
        assert_eq!(record.start, 1.5);
        assert_eq!(record.end, 3.0);
    }

    #[test]
    fn test_file_metadata_rounds_size_to_two_decimals() {
        let metadata = FileMetadata::new(2_411_725, "sample.mp3");
        assert_eq!(metadata.size_mb, 2.3);
        assert_eq!(metadata.extension, "mp3");
    }

    #[test]
    fn test_file_metadata_lowercases_extension() {
        let metadata = FileMetadata::new(1024, "Recording.MP4");
        assert_eq!(metadata.extension, "mp4");
    }

    #[test]
    fn test_file_metadata_without_extension() {
        let metadata = FileMetadata::new(1024, "noext");
        assert_eq!(metadata.extension, "");
    }

    #[test]
    fn test_round_helpers() {
        assert_eq!(round1(0.08666), 0.1);
        assert_eq!(round1(0.84), 0.8);
        assert_eq!(round2(2.30000019), 2.3);
        assert_eq!(round2(1.005), 1.0);
    }
}
