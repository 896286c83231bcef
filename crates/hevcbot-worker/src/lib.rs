//! HEVC transcoding bot worker.
//!
//! Consumes incoming video messages, transcodes them to HEVC with
//! ffmpeg while reporting live progress, delivers the result, and
//! guarantees temp-file cleanup on every exit path.

pub mod config;
pub mod delivery;
pub mod encode;
pub mod error;
pub mod files;
pub mod handler;
pub mod monitor;
pub mod status;

pub use config::{BotConfig, MAX_FILE_SIZE, PROGRESS_POLL_INTERVAL};
pub use error::{WorkerError, WorkerResult};
pub use handler::MessageHandler;
