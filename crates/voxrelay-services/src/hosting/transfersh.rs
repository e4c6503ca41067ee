use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use super::{file_name, require_url, UploadTarget};

/// transfer.sh hosting. Files are PUT to `{base}/{filename}` with a
/// one-day retention header; the response body is the download URL.
pub struct TransferShTarget {
    client: Client,
    base_url: String,
}

impl TransferShTarget {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for transfer.sh")?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl UploadTarget for TransferShTarget {
    fn name(&self) -> &'static str {
        "transfersh"
    }

    async fn upload(&self, path: &Path) -> Result<String> {
        let filename = file_name(path)?.to_string();
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        tracing::debug!(filename = %filename, bytes = data.len(), "Uploading to transfer.sh");

        let response = self
            .client
            .put(format!("{}/{}", self.base_url, filename))
            .header("Max-Days", "1")
            .body(data)
            .send()
            .await
            .context("Failed to send file to transfer.sh")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "transfer.sh upload failed: {} - {}",
                status,
                error_text
            ));
        }

        let body = response
            .text()
            .await
            .context("Failed to read transfer.sh response")?;
        require_url("transfersh", &body)
    }
}
