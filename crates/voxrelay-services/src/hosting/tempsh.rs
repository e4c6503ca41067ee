use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use super::{file_name, require_url, UploadTarget};

/// temp.sh hosting. Last resort in the default chain; multipart POST to
/// `{base}/upload` with the file under the `file` part.
pub struct TempShTarget {
    client: Client,
    base_url: String,
}

impl TempShTarget {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for temp.sh")?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl UploadTarget for TempShTarget {
    fn name(&self) -> &'static str {
        "tempsh"
    }

    async fn upload(&self, path: &Path) -> Result<String> {
        let filename = file_name(path)?.to_string();
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        tracing::debug!(filename = %filename, bytes = data.len(), "Uploading to temp.sh");

        let form = Form::new().part("file", Part::bytes(data).file_name(filename));

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .context("Failed to send file to temp.sh")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "temp.sh upload failed: {} - {}",
                status,
                error_text
            ));
        }

        let body = response
            .text()
            .await
            .context("Failed to read temp.sh response")?;
        require_url("tempsh", &body)
    }
}
