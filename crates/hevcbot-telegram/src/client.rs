//! Bot API HTTP client.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;

use crate::error::{TelegramError, TelegramResult};
use crate::types::{ApiResponse, File, Message, MessageRef, Update};

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Chunk size for streamed uploads.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Telegram Bot API client.
#[derive(Debug, Clone)]
pub struct BotClient {
    http: Client,
    base_url: String,
    token: String,
}

impl BotClient {
    /// Create a new client for the given bot token.
    pub fn new(token: impl Into<String>) -> TelegramResult<Self> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom API endpoint (tests).
    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> TelegramResult<Self> {
        // No overall request timeout: long polls and large uploads are
        // expected to hold the connection open.
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("hevcbot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Call a JSON-body API method and unwrap the response envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &impl Serialize,
    ) -> TelegramResult<T> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;
        Self::unwrap_envelope(method, response.json().await?)
    }

    /// Classify an API response envelope into a result or typed error.
    fn unwrap_envelope<T>(method: &str, envelope: ApiResponse<T>) -> TelegramResult<T> {
        if envelope.ok {
            return envelope.result.ok_or_else(|| {
                TelegramError::InvalidResponse(format!("{method}: ok response without result"))
            });
        }

        let code = envelope.error_code.unwrap_or(0);
        let description = envelope.description.unwrap_or_default();

        if let Some(retry_after) = envelope.parameters.and_then(|p| p.retry_after) {
            return Err(TelegramError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }
        if code == 413 || description.contains("Request Entity Too Large") {
            return Err(TelegramError::FileTooLarge);
        }
        Err(TelegramError::Api { code, description })
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> TelegramResult<Vec<Update>> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    /// Send a text reply; returns a handle for later edits.
    pub async fn send_message(
        &self,
        chat_id: i64,
        reply_to: i64,
        text: &str,
    ) -> TelegramResult<MessageRef> {
        let message: Message = self
            .call(
                "sendMessage",
                &json!({
                    "chat_id": chat_id,
                    "reply_to_message_id": reply_to,
                    "text": text,
                }),
            )
            .await?;
        Ok(MessageRef {
            chat_id,
            message_id: message.message_id,
        })
    }

    /// Rewrite the text of a previously sent message.
    pub async fn edit_message_text(&self, msg: &MessageRef, text: &str) -> TelegramResult<()> {
        // The API returns the edited Message or `true`; neither is needed.
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                &json!({
                    "chat_id": msg.chat_id,
                    "message_id": msg.message_id,
                    "text": text,
                }),
            )
            .await?;
        Ok(())
    }

    /// Upload a video file as a reply with a caption.
    pub async fn send_video(
        &self,
        chat_id: i64,
        reply_to: i64,
        video: &Path,
        caption: &str,
    ) -> TelegramResult<()> {
        let file_name = video
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "video.mp4".to_string());

        let file = tokio::fs::File::open(video).await?;
        let part = Part::stream(reqwest::Body::wrap_stream(chunked_file_stream(file)))
            .file_name(file_name)
            .mime_str("video/mp4")
            .map_err(TelegramError::Http)?;

        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("reply_to_message_id", reply_to.to_string())
            .text("caption", caption.to_string())
            .part("video", part);

        let response = self
            .http
            .post(self.method_url("sendVideo"))
            .multipart(form)
            .send()
            .await?;

        let _: Message = Self::unwrap_envelope("sendVideo", response.json().await?)?;
        Ok(())
    }

    /// Download a file by its per-upload identifier to `dest`.
    pub async fn download_file(&self, file_id: &str, dest: &Path) -> TelegramResult<()> {
        let file: File = self
            .call("getFile", &json!({ "file_id": file_id }))
            .await?;
        let file_path = file.file_path.ok_or_else(|| {
            TelegramError::InvalidResponse("getFile: no file_path in response".to_string())
        })?;

        let url = format!("{}/file/bot{}/{}", self.base_url, self.token, file_path);
        debug!("Downloading {} to {}", file_id, dest.display());

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(TelegramError::Api {
                code: response.status().as_u16() as i64,
                description: format!("file download failed for {file_id}"),
            });
        }

        let mut out = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            out.write_all(&chunk.map_err(TelegramError::Http)?).await?;
        }
        out.flush().await?;
        Ok(())
    }
}

/// Turn an open file into a chunked byte stream for upload bodies.
fn chunked_file_stream(
    file: tokio::fs::File,
) -> impl futures_util::Stream<Item = Result<Vec<u8>, std::io::Error>> {
    futures_util::stream::unfold(file, |mut file| async move {
        let mut buf = vec![0u8; UPLOAD_CHUNK_SIZE];
        match file.read(&mut buf).await {
            Ok(0) => None,
            Ok(n) => {
                buf.truncate(n);
                Some((Ok(buf), file))
            }
            Err(e) => Some((Err(e), file)),
        }
    })
}
