//! FFprobe video information.
//!
//! Probe output reflects whatever container metadata the uploader
//! sent, so it is decoded through a strict serde model and coerced
//! field by field. Missing or malformed values degrade to zero/empty
//! rather than failing the parse.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::warn;

use crate::error::{MediaError, MediaResult};

/// Video file information.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoInfo {
    /// Duration in seconds; 0.0 means unknown/invalid
    pub duration: f64,
    /// Primary video stream codec name, empty if unknown
    pub codec: String,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
}

/// Parse raw ffprobe JSON into [`VideoInfo`].
///
/// Duration is coerced to a non-negative float; the codec comes from
/// the first video stream, or the first stream at all if ffprobe
/// reported no stream types.
pub fn parse_probe_output(raw: &[u8]) -> MediaResult<VideoInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(raw)?;

    let duration = probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite())
        .unwrap_or(0.0)
        .max(0.0);

    let codec = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .or_else(|| probe.streams.first())
        .and_then(|s| s.codec_name.clone())
        .unwrap_or_default();

    Ok(VideoInfo { duration, codec })
}

/// Probe a video file for duration and codec.
pub async fn probe_video(path: impl AsRef<Path>) -> MediaResult<VideoInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::ffprobe_failed(
            format!("ffprobe exited with {}", output.status),
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
        ));
    }

    parse_probe_output(&output.stdout)
}

/// Probe a file, treating every failure as recoverable.
///
/// Missing files, non-zero exits, and parse failures all log a
/// warning and yield a zero-duration, empty-codec result. Callers
/// decide what an unknown duration means for them.
pub async fn probe_or_default(path: impl AsRef<Path>) -> VideoInfo {
    let path = path.as_ref();
    match probe_video(path).await {
        Ok(info) => info,
        Err(e) => {
            warn!("Error checking video info for {}: {}", path.display(), e);
            VideoInfo::default()
        }
    }
}
