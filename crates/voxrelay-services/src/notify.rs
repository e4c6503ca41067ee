//! Webhook notifications with a minimum-interval rate limit.
//!
//! Delivery is best effort: the notifier reports success as a `bool` and a
//! failed or skipped notification never fails the surrounding request.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::sync::{Mutex, MutexGuard};

use voxrelay_core::{Config, NotificationMeta};

/// Spaces sends at least `min_interval` apart.
///
/// `acquire` serializes callers on an async mutex and sleeps out whatever
/// remains of the interval since the last successful send, still holding the
/// lock. The returned slot keeps the lock through the send itself;
/// [`RateLimitSlot::mark_sent`] stamps the timestamp only when the send
/// actually went through.
pub struct RateLimiter {
    min_interval: Duration,
    last_sent: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_sent: Mutex::new(None),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn acquire(&self) -> RateLimitSlot<'_> {
        let guard = self.last_sent.lock().await;

        if let Some(last) = *guard {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::debug!(wait_ms = wait.as_millis() as u64, "Rate limit wait");
                tokio::time::sleep(wait).await;
            }
        }

        RateLimitSlot { guard }
    }
}

/// Exclusive permission to send, held until dropped.
pub struct RateLimitSlot<'a> {
    guard: MutexGuard<'a, Option<Instant>>,
}

impl RateLimitSlot<'_> {
    /// Records a successful send. Dropping the slot without calling this
    /// leaves the previous timestamp in place, so a failed attempt does not
    /// delay the next one.
    pub fn mark_sent(mut self) {
        *self.guard = Some(Instant::now());
    }
}

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub webhook_url: Option<String>,
    pub request_timeout: Duration,
    pub min_interval: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl NotifierConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            webhook_url: config.webhook_url.clone(),
            request_timeout: Duration::from_secs(config.webhook_timeout_secs),
            min_interval: config.min_send_interval(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
        }
    }
}

pub struct Notifier {
    client: Client,
    webhook_url: Option<String>,
    limiter: RateLimiter,
    max_retries: u32,
    retry_delay: Duration,
}

impl Notifier {
    pub fn new(config: NotifierConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .context("Failed to create HTTP client for webhook notifications")?;

        Ok(Self {
            client,
            webhook_url: config.webhook_url,
            limiter: RateLimiter::new(config.min_interval),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
        })
    }

    /// Posts the message to the configured webhook.
    ///
    /// Returns whether a post succeeded. Transport failures and non-2xx
    /// statuses retry the entire send, rate-limit wait included, up to
    /// `max_retries` times.
    #[tracing::instrument(skip(self, message), fields(message_len = message.len()))]
    pub async fn send(&self, message: &str) -> bool {
        let url = match self.webhook_url.as_deref() {
            Some(url) => url,
            None => {
                tracing::warn!("WEBHOOK_URL not configured, skipping notification");
                return false;
            }
        };

        let payload = serde_json::json!({
            "msg_type": "text",
            "content": { "text": message }
        });

        let mut attempts = 0;
        let max_attempts = self.max_retries + 1;

        loop {
            let slot = self.limiter.acquire().await;

            match self.post(url, &payload).await {
                Ok(()) => {
                    slot.mark_sent();
                    tracing::info!("Notification delivered");
                    return true;
                }
                Err(e) => {
                    drop(slot);
                    attempts += 1;
                    if attempts >= max_attempts {
                        tracing::error!(
                            error = %e,
                            attempts,
                            "Giving up on webhook notification"
                        );
                        return false;
                    }
                    tracing::warn!(
                        error = %e,
                        attempt = attempts,
                        max_attempts,
                        "Webhook send failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }

    async fn post(&self, url: &str, payload: &serde_json::Value) -> Result<()> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .context("Failed to send webhook request")?;

        let status_code = response.status().as_u16();
        if !(200..300).contains(&status_code) {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!(
                "Webhook returned non-2xx status: {} - {}",
                status_code,
                error_text
            );
        }

        Ok(())
    }
}

/// Renders the chat notification for a finished transcription.
pub fn format_notification(text: &str, meta: &NotificationMeta) -> String {
    let duration = meta
        .duration_minutes
        .map(|minutes| format!("{} minutes", minutes))
        .unwrap_or_else(|| "unknown".to_string());
    let size = meta
        .file_size_mb
        .map(|mb| format!("{} MB", mb))
        .unwrap_or_else(|| "unknown".to_string());
    let format = meta.file_type.as_deref().unwrap_or("unknown");

    format!(
        "📝 New transcription\n\
         🎤 Duration: {}\n\
         📊 Size: {}\n\
         📁 Format: {}\n\
         🕒 Times are [start -> end] offsets in seconds\n\
         \n\
         {}",
        duration, size, format, text
    )
}
