//! Per-job status message.

use std::sync::Arc;

use hevcbot_telegram::{MessageRef, Transport};
use tracing::warn;

/// The one mutable status surface a job owns.
///
/// Edits are best effort: a failed edit is logged and never interrupts
/// the pipeline.
#[derive(Clone)]
pub struct StatusMessage {
    transport: Arc<dyn Transport>,
    msg: MessageRef,
}

impl StatusMessage {
    pub fn new(transport: Arc<dyn Transport>, msg: MessageRef) -> Self {
        Self { transport, msg }
    }

    /// Replace the status text.
    pub async fn set(&self, text: &str) {
        if let Err(e) = self.transport.edit_message(&self.msg, text).await {
            warn!("Status update failed for message {}: {}", self.msg.message_id, e);
        }
    }
}
