//! Transport abstraction over the Bot API.

use std::path::Path;

use async_trait::async_trait;

use crate::client::BotClient;
use crate::error::TelegramResult;
use crate::types::MessageRef;

/// The messaging operations the pipeline needs.
///
/// Implemented by [`BotClient`] for production and by in-memory fakes
/// in tests.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Fetch the remote file behind `file_id` into `dest`.
    async fn download_file(&self, file_id: &str, dest: &Path) -> TelegramResult<()>;

    /// Send a text reply and return a handle for later edits.
    async fn send_message(
        &self,
        chat_id: i64,
        reply_to: i64,
        text: &str,
    ) -> TelegramResult<MessageRef>;

    /// Replace the text of a previously sent message.
    async fn edit_message(&self, msg: &MessageRef, text: &str) -> TelegramResult<()>;

    /// Upload a video as a reply with a caption.
    async fn send_video(
        &self,
        chat_id: i64,
        reply_to: i64,
        video: &Path,
        caption: &str,
    ) -> TelegramResult<()>;
}

#[async_trait]
impl Transport for BotClient {
    async fn download_file(&self, file_id: &str, dest: &Path) -> TelegramResult<()> {
        BotClient::download_file(self, file_id, dest).await
    }

    async fn send_message(
        &self,
        chat_id: i64,
        reply_to: i64,
        text: &str,
    ) -> TelegramResult<MessageRef> {
        BotClient::send_message(self, chat_id, reply_to, text).await
    }

    async fn edit_message(&self, msg: &MessageRef, text: &str) -> TelegramResult<()> {
        BotClient::edit_message_text(self, msg, text).await
    }

    async fn send_video(
        &self,
        chat_id: i64,
        reply_to: i64,
        video: &Path,
        caption: &str,
    ) -> TelegramResult<()> {
        BotClient::send_video(self, chat_id, reply_to, video, caption).await
    }
}
