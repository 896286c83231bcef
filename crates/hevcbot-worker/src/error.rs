//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Encode failed: {0}")]
    EncodeFailed(String),

    #[error("Media error: {0}")]
    Media(#[from] hevcbot_media::MediaError),

    #[error("Telegram error: {0}")]
    Telegram(#[from] hevcbot_telegram::TelegramError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn encode_failed(msg: impl Into<String>) -> Self {
        Self::EncodeFailed(msg.into())
    }
}
