//! Bot API wire types.
//!
//! Only the fields the pipeline reads are modeled; everything else in
//! the API payloads is ignored by serde.

use serde::{Deserialize, Serialize};

/// One long-poll update.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

/// An incoming chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
    pub video: Option<Video>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// A video attachment with its declared size.
///
/// `file_size` is whatever the sender's client declared; the actual
/// transferred size must be re-checked on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    /// Stable per-upload identifier
    pub file_id: String,
    /// Declared size in bytes, if the transport reported one
    pub file_size: Option<u64>,
}

/// Handle to a sent message, enough to edit it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i64,
}

/// `getFile` result.
#[derive(Debug, Clone, Deserialize)]
pub struct File {
    pub file_id: String,
    pub file_path: Option<String>,
}

/// Standard Bot API response envelope.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub error_code: Option<i64>,
    pub description: Option<String>,
    pub parameters: Option<ResponseParameters>,
}

/// Extra error detail the API attaches to some failures.
#[derive(Debug, Deserialize)]
pub struct ResponseParameters {
    pub retry_after: Option<u64>,
}
