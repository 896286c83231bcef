//! Encoded artifact delivery.

use std::path::Path;
use std::sync::Arc;

use hevcbot_telegram::{TelegramError, Transport};
use tracing::{error, info, warn};

/// How the upload attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// Transport rejected the artifact as too large
    TooLarge,
    /// Any other failure, including an exhausted rate-limit retry
    Failed,
}

/// Uploads the encoded file, honoring a single rate-limit retry.
pub struct DeliveryCoordinator {
    transport: Arc<dyn Transport>,
}

impl DeliveryCoordinator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Upload `video` as a reply. On a rate limit, sleep exactly the
    /// server-mandated duration and retry exactly once.
    pub async fn deliver(
        &self,
        chat_id: i64,
        reply_to: i64,
        video: &Path,
        caption: &str,
    ) -> DeliveryOutcome {
        match self.transport.send_video(chat_id, reply_to, video, caption).await {
            Ok(()) => return DeliveryOutcome::Delivered,
            Err(TelegramError::RateLimited { retry_after }) => {
                warn!(
                    "Upload rate limited, retrying in {}s",
                    retry_after.as_secs_f64()
                );
                tokio::time::sleep(retry_after).await;
            }
            Err(TelegramError::FileTooLarge) => {
                warn!("Upload rejected as too large: {}", video.display());
                return DeliveryOutcome::TooLarge;
            }
            Err(e) => {
                error!("Upload failed: {}", e);
                return DeliveryOutcome::Failed;
            }
        }

        match self.transport.send_video(chat_id, reply_to, video, caption).await {
            Ok(()) => {
                info!("Upload succeeded after rate-limit retry");
                DeliveryOutcome::Delivered
            }
            Err(TelegramError::FileTooLarge) => {
                warn!("Upload rejected as too large: {}", video.display());
                DeliveryOutcome::TooLarge
            }
            Err(e) => {
                error!("Upload retry failed: {}", e);
                DeliveryOutcome::Failed
            }
        }
    }
}
