//! Transcription API client.
//!
//! The API consumes files by URL, so every attempt starts with a hosting
//! upload via [`FileHoster`] and then fetches
//! `GET {base}/{token}/subtitle?url=<public-url>`.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;

use voxrelay_core::{AppError, Config, SubtitleRecord, TranscriptResult};

use crate::hosting::FileHoster;

#[derive(Debug, Clone)]
pub struct TranscriberConfig {
    pub base_url: String,
    pub token: String,
    pub request_timeout: Duration,
    /// Retries after the first attempt; the cycle runs at most
    /// `max_retries + 1` times.
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl TranscriberConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.transcribe_base_url.clone(),
            token: config.transcribe_token.clone(),
            request_timeout: Duration::from_secs(config.transcribe_timeout_secs),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SubtitleResponse {
    #[serde(default)]
    success: bool,
    detail: Option<SubtitleDetail>,
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubtitleDetail {
    #[serde(default, rename = "subtitlesArray")]
    subtitles_array: Vec<SubtitleRecord>,
}

/// Failure class of a single subtitle fetch.
enum FetchError {
    /// Request/connect error or non-2xx status. Worth retrying.
    Transport(anyhow::Error),
    /// API-level rejection or undecodable body. Retrying cannot help.
    Fatal(String),
}

pub struct TranscriptionClient {
    client: Client,
    hoster: FileHoster,
    config: TranscriberConfig,
}

impl TranscriptionClient {
    pub fn new(hoster: FileHoster, config: TranscriberConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to create HTTP client for transcription")?;

        Ok(Self {
            client,
            hoster,
            config,
        })
    }

    /// Hosts the file publicly and fetches its transcript.
    ///
    /// Transport failures are retried up to `max_retries` times with a fixed
    /// delay. Public links are short-lived, so each retry re-runs the hosting
    /// upload as well. API rejections and undecodable bodies are final, as is
    /// an exhausted hosting chain.
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn transcribe(&self, path: &Path) -> Result<TranscriptResult, AppError> {
        let mut attempts = 0;
        let max_attempts = self.config.max_retries + 1;

        loop {
            let public_url = self.hoster.obtain_public_url(path).await?;

            match self.fetch_subtitles(&public_url).await {
                Ok(records) => {
                    let transcript = TranscriptResult::from_records(records);
                    tracing::info!(
                        lines = transcript.records.len(),
                        duration_minutes = transcript.duration_minutes,
                        "Transcription complete"
                    );
                    return Ok(transcript);
                }
                Err(FetchError::Fatal(reason)) => {
                    return Err(AppError::TranscriptionFailed(reason));
                }
                Err(FetchError::Transport(e)) => {
                    attempts += 1;
                    if attempts >= max_attempts {
                        return Err(AppError::TranscriptionFailed(format!(
                            "{} (after {} attempts)",
                            e, attempts
                        )));
                    }
                    tracing::warn!(
                        error = %e,
                        attempt = attempts,
                        max_attempts,
                        "Transcription attempt failed, retrying"
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
            }
        }
    }

    async fn fetch_subtitles(&self, public_url: &str) -> Result<Vec<SubtitleRecord>, FetchError> {
        tracing::debug!(url = %public_url, "Requesting transcription");

        let endpoint = format!("{}/{}/subtitle", self.config.base_url, self.config.token);
        let response = self
            .client
            .get(&endpoint)
            .query(&[("url", public_url)])
            .send()
            .await
            .map_err(|e| {
                FetchError::Transport(anyhow::anyhow!("Transcription request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FetchError::Transport(anyhow::anyhow!(
                "Transcription API returned {}: {}",
                status,
                error_text
            )));
        }

        let body: SubtitleResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Fatal(format!("Undecodable transcription response: {}", e)))?;

        if !body.success {
            let reason = body
                .message
                .or(body.error)
                .unwrap_or_else(|| "unknown transcription failure".to_string());
            return Err(FetchError::Fatal(reason));
        }

        Ok(body
            .detail
            .map(|detail| detail.subtitles_array)
            .unwrap_or_default())
    }
}
