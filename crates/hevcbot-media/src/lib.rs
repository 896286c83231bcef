#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for the hevcbot transcode pipeline.
//!
//! This crate provides:
//! - Strict typed parsing of ffprobe JSON output
//! - Type-safe FFmpeg command building and running
//! - The `Prober`/`Encoder` trait seams the orchestrator runs against

pub mod command;
pub mod error;
pub mod probe;
pub mod traits;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand};
pub use error::{MediaError, MediaResult};
pub use probe::{parse_probe_output, probe_or_default, probe_video, VideoInfo};
pub use traits::{Encoder, FfprobeProber, HevcEncoder, Prober};

/// Codec name the pipeline transcodes to. Sources already in this
/// codec are skipped without launching the encoder.
pub const TARGET_CODEC: &str = "hevc";
