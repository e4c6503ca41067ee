//! Configuration module
//!
//! Environment-driven settings for the HTTP server, upload intake, the file
//! hosting chain, the transcription API, and the notification webhook.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

// Common constants
const PORT: u16 = 5000;
const MAX_UPLOAD_SIZE_MB: usize = 32;
const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_SECS: u64 = 5;
const CLEANUP_INTERVAL_SECS: u64 = 3600;
const MAX_FILE_AGE_SECS: u64 = 3600;
const MESSAGES_PER_MINUTE: u32 = 20;
const RATE_LIMIT: &str = "20/minute";
const HOSTING_TIMEOUT_SECS: u64 = 300;
const TRANSCRIBE_TIMEOUT_SECS: u64 = 600;
const WEBHOOK_TIMEOUT_SECS: u64 = 30;
const MONITOR_INTERVAL_SECS: u64 = 2;
const MAX_CPU_USAGE_PERCENT: f64 = 80.0;
const MAX_MEMORY_USAGE_PERCENT: f64 = 80.0;

/// Application configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    // Upload intake
    pub upload_dir: PathBuf,
    pub max_upload_size_bytes: usize,
    pub audio_extensions: Vec<String>,
    pub video_extensions: Vec<String>,
    pub ffmpeg_path: String,
    // File hosting chain
    pub upload_targets: Vec<String>,
    pub catbox_base_url: String,
    pub transfersh_base_url: String,
    pub tempsh_base_url: String,
    pub hosting_timeout_secs: u64,
    // Transcription API
    pub transcribe_base_url: String,
    pub transcribe_token: String,
    pub transcribe_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    // Notification webhook
    pub webhook_url: Option<String>,
    pub webhook_timeout_secs: u64,
    pub messages_per_minute: u32,
    // Background tasks
    pub cleanup_interval_secs: u64,
    pub max_file_age_secs: u64,
    pub monitor_interval_secs: u64,
    pub max_cpu_usage_percent: f64,
    pub max_memory_usage_percent: f64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let messages_per_minute = parse_rate_limit(
            &env::var("RATE_LIMIT").unwrap_or_else(|_| RATE_LIMIT.to_string()),
        )
        .unwrap_or(MESSAGES_PER_MINUTE);

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            upload_dir: PathBuf::from(
                env::var("UPLOAD_DIR").unwrap_or_else(|_| "/tmp/voxrelay-uploads".to_string()),
            ),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            audio_extensions: env::var("AUDIO_ALLOWED_EXTENSIONS")
                .unwrap_or_else(|_| "mp3,m4a,wav,ogg".to_string())
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .collect(),
            video_extensions: env::var("VIDEO_ALLOWED_EXTENSIONS")
                .unwrap_or_else(|_| "mp4,mov,avi,mkv".to_string())
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .collect(),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            upload_targets: env::var("UPLOAD_TARGETS")
                .unwrap_or_else(|_| "catbox,transfersh,tempsh".to_string())
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            catbox_base_url: env::var("CATBOX_BASE_URL")
                .unwrap_or_else(|_| "https://catbox.moe".to_string()),
            transfersh_base_url: env::var("TRANSFERSH_BASE_URL")
                .unwrap_or_else(|_| "https://transfer.sh".to_string()),
            tempsh_base_url: env::var("TEMPSH_BASE_URL")
                .unwrap_or_else(|_| "https://temp.sh".to_string()),
            hosting_timeout_secs: env::var("HOSTING_TIMEOUT_SECS")
                .unwrap_or_else(|_| HOSTING_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(HOSTING_TIMEOUT_SECS),
            transcribe_base_url: env::var("TRANSCRIBE_API_BASE_URL")
                .unwrap_or_else(|_| "https://bibigpt.co/api/open".to_string()),
            transcribe_token: env::var("TRANSCRIBE_API_TOKEN")
                .map_err(|_| anyhow::anyhow!("TRANSCRIBE_API_TOKEN must be set"))?,
            transcribe_timeout_secs: env::var("TRANSCRIBE_TIMEOUT_SECS")
                .unwrap_or_else(|_| TRANSCRIBE_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(TRANSCRIBE_TIMEOUT_SECS),
            max_retries: env::var("MAX_RETRIES")
                .unwrap_or_else(|_| MAX_RETRIES.to_string())
                .parse()
                .unwrap_or(MAX_RETRIES),
            retry_delay_secs: env::var("RETRY_DELAY_SECS")
                .unwrap_or_else(|_| RETRY_DELAY_SECS.to_string())
                .parse()
                .unwrap_or(RETRY_DELAY_SECS),
            webhook_url: env::var("WEBHOOK_URL").ok().filter(|s| !s.is_empty()),
            webhook_timeout_secs: env::var("WEBHOOK_TIMEOUT_SECS")
                .unwrap_or_else(|_| WEBHOOK_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(WEBHOOK_TIMEOUT_SECS),
            messages_per_minute,
            cleanup_interval_secs: env::var("CLEANUP_INTERVAL_SECS")
                .unwrap_or_else(|_| CLEANUP_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(CLEANUP_INTERVAL_SECS),
            max_file_age_secs: env::var("MAX_FILE_AGE_SECS")
                .unwrap_or_else(|_| MAX_FILE_AGE_SECS.to_string())
                .parse()
                .unwrap_or(MAX_FILE_AGE_SECS),
            monitor_interval_secs: env::var("MONITOR_INTERVAL_SECS")
                .unwrap_or_else(|_| MONITOR_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(MONITOR_INTERVAL_SECS),
            max_cpu_usage_percent: env::var("MAX_CPU_USAGE_PERCENT")
                .unwrap_or_else(|_| MAX_CPU_USAGE_PERCENT.to_string())
                .parse()
                .unwrap_or(MAX_CPU_USAGE_PERCENT),
            max_memory_usage_percent: env::var("MAX_MEMORY_USAGE_PERCENT")
                .unwrap_or_else(|_| MAX_MEMORY_USAGE_PERCENT.to_string())
                .parse()
                .unwrap_or(MAX_MEMORY_USAGE_PERCENT),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.transcribe_token.trim().is_empty() {
            return Err(anyhow::anyhow!("TRANSCRIBE_API_TOKEN must not be empty"));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.audio_extensions.iter().all(|e| e.is_empty()) {
            return Err(anyhow::anyhow!(
                "AUDIO_ALLOWED_EXTENSIONS must list at least one extension"
            ));
        }

        if self.upload_targets.is_empty() {
            return Err(anyhow::anyhow!(
                "UPLOAD_TARGETS must list at least one hosting target"
            ));
        }

        if self.messages_per_minute == 0 {
            return Err(anyhow::anyhow!("RATE_LIMIT must allow at least 1 message per minute"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// Minimum spacing between webhook sends, derived from the per-minute rate.
    pub fn min_send_interval(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.messages_per_minute as f64)
    }
}

/// Parse a rate limit string of the form `"20/minute"` into messages per minute.
/// Returns `None` when the count is missing, non-numeric, or zero.
pub fn parse_rate_limit(raw: &str) -> Option<u32> {
    raw.split('/')
        .next()
        .and_then(|count| count.trim().parse::<u32>().ok())
        .filter(|&n| n > 0)
}
