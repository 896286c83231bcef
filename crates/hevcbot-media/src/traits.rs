//! Trait seams for the external prober and encoder processes.
//!
//! The orchestrator and progress monitor run against these traits so
//! tests can substitute deterministic fakes for the real binaries.

use async_trait::async_trait;
use std::path::Path;

use crate::command::FfmpegCommand;
use crate::error::MediaResult;
use crate::probe::{probe_or_default, VideoInfo};

/// Read-only media inspection.
///
/// Probing is always recoverable: implementations report failures as
/// a zero-duration, empty-codec result instead of erroring.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, path: &Path) -> VideoInfo;
}

/// External transcode invocation with the fixed HEVC settings.
#[async_trait]
pub trait Encoder: Send + Sync {
    async fn transcode(&self, input: &Path, output: &Path) -> MediaResult<()>;
}

/// Production prober backed by the ffprobe binary.
#[derive(Debug, Clone, Default)]
pub struct FfprobeProber;

#[async_trait]
impl Prober for FfprobeProber {
    async fn probe(&self, path: &Path) -> VideoInfo {
        probe_or_default(path).await
    }
}

/// Production encoder backed by the ffmpeg binary.
#[derive(Debug, Clone, Default)]
pub struct HevcEncoder;

#[async_trait]
impl Encoder for HevcEncoder {
    async fn transcode(&self, input: &Path, output: &Path) -> MediaResult<()> {
        FfmpegCommand::hevc_transcode(input, output).run().await
    }
}
