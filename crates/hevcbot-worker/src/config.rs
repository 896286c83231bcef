//! Bot configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{WorkerError, WorkerResult};

/// Largest file accepted or produced, in bytes (2 GiB).
pub const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// How often the progress monitor probes the growing output file.
pub const PROGRESS_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Application identifier issued with the API credentials
    pub api_id: i64,
    /// Application secret issued with the API credentials
    pub api_hash: String,
    /// Bot token used for all API calls
    pub token: String,
    /// Directory for per-job temporary files
    pub temp_dir: PathBuf,
    /// Long-poll timeout for update fetching
    pub poll_timeout: Duration,
}

impl BotConfig {
    /// Create config from environment variables.
    ///
    /// `API_ID`, `API_HASH` and `TELEGRAM_TOKEN` are required.
    pub fn from_env() -> WorkerResult<Self> {
        let api_id = std::env::var("API_ID")
            .map_err(|_| WorkerError::config_error("API_ID not set"))?
            .parse()
            .map_err(|_| WorkerError::config_error("API_ID is not a number"))?;
        let api_hash = std::env::var("API_HASH")
            .map_err(|_| WorkerError::config_error("API_HASH not set"))?;
        let token = std::env::var("TELEGRAM_TOKEN")
            .map_err(|_| WorkerError::config_error("TELEGRAM_TOKEN not set"))?;

        Ok(Self {
            api_id,
            api_hash,
            token,
            temp_dir: std::env::var("BOT_TEMP_DIR")
                .unwrap_or_else(|_| "temp".to_string())
                .into(),
            poll_timeout: Duration::from_secs(
                std::env::var("BOT_POLL_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        })
    }
}
