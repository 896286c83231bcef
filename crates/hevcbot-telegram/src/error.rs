//! Telegram API error types.

use std::time::Duration;
use thiserror::Error;

/// Result type for Telegram operations.
pub type TelegramResult<T> = Result<T, TelegramError>;

/// Errors that can occur while talking to the Bot API.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// The API asked us to back off for a server-specified duration.
    #[error("Rate limited, retry after {}s", .retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    /// The payload exceeded the transport's size limit.
    #[error("File too large for the transport")]
    FileTooLarge,

    /// Any other API-level rejection.
    #[error("API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("Malformed API response: {0}")]
    InvalidResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TelegramError {
    /// The mandated backoff, if this is a rate-limit condition.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            TelegramError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, TelegramError::RateLimited { .. })
    }

    pub fn is_too_large(&self) -> bool {
        matches!(self, TelegramError::FileTooLarge)
    }
}
