use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use super::{file_name, require_url, UploadTarget};

/// catbox.moe anonymous hosting. Uploads go through the `user/api.php`
/// endpoint as a `fileupload` request; the response body is the raw URL.
pub struct CatboxTarget {
    client: Client,
    base_url: String,
}

impl CatboxTarget {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for catbox")?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl UploadTarget for CatboxTarget {
    fn name(&self) -> &'static str {
        "catbox"
    }

    async fn upload(&self, path: &Path) -> Result<String> {
        let filename = file_name(path)?.to_string();
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        tracing::debug!(filename = %filename, bytes = data.len(), "Uploading to catbox");

        let form = Form::new()
            .text("reqtype", "fileupload")
            .part("fileToUpload", Part::bytes(data).file_name(filename));

        let response = self
            .client
            .post(format!("{}/user/api.php", self.base_url))
            .multipart(form)
            .send()
            .await
            .context("Failed to send file to catbox")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "catbox upload failed: {} - {}",
                status,
                error_text
            ));
        }

        let body = response
            .text()
            .await
            .context("Failed to read catbox response")?;
        require_url("catbox", &body)
    }
}
