//! Audio extraction from video uploads via ffmpeg.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use uuid::Uuid;

use voxrelay_core::{AppError, Config};

pub struct AudioExtractor {
    ffmpeg_path: String,
    output_dir: PathBuf,
}

impl AudioExtractor {
    pub fn new(ffmpeg_path: String, output_dir: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            output_dir,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ffmpeg_path.clone(), config.upload_dir.clone())
    }

    /// Strips the video track and re-encodes the audio as MP3.
    ///
    /// The result lands next to the upload as `<uuid>.mp3`; the caller owns
    /// deleting both files when the request finishes.
    #[tracing::instrument(skip(self, input), fields(input = %input.display()))]
    pub async fn extract_audio(&self, input: &Path) -> Result<PathBuf, AppError> {
        let output_path = self.output_dir.join(format!("{}.mp3", Uuid::new_v4()));

        tracing::info!(output = %output_path.display(), "Extracting audio track");

        let output = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(input)
            .args([
                "-vn", "-acodec", "libmp3lame", "-ar", "44100", "-ab", "192k", "-y",
            ])
            .arg(&output_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                AppError::ExtractionFailed(format!("Failed to execute ffmpeg: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::ExtractionFailed(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(output_path)
    }
}
