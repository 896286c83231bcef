//! Telegram Bot API client.
//!
//! A thin HTTPS client over the Bot API: long-poll update consumption,
//! file download, status-message send/edit, and video upload, with
//! rate-limit and size-limit conditions classified into typed errors.
//!
//! Pipeline code depends on the [`Transport`] trait, not on
//! [`BotClient`] directly, so tests can substitute a fake transport.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::BotClient;
pub use error::{TelegramError, TelegramResult};
pub use transport::Transport;
pub use types::{Chat, Message, MessageRef, Update, Video};
