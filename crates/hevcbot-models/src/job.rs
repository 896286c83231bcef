//! Job definitions for the transcode pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Stable per-upload identifier assigned by the transport.
///
/// Temporary file names are derived from this, so it is the only
/// thing that keeps concurrent jobs from colliding on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub String);

impl FileId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle phase of a transcode job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    /// Incoming event accepted, nothing transferred yet
    #[default]
    Received,
    /// Transferring the source file to local storage
    Downloading,
    /// Probing the source for duration and codec
    Validating,
    /// Source was already in the target codec, no work done
    SkippedAlreadyEncoded,
    /// External encoder process is running
    Encoding,
    /// Encoder exited non-zero or the encode phase errored
    EncodeFailed,
    /// Encoder exited cleanly, artifact is on disk
    Encoded,
    /// Uploading the artifact back through the transport
    Uploading,
    /// Artifact handed back to the user
    Delivered,
    /// Upload was rejected or failed
    DeliveryFailed,
}

impl JobPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPhase::Received => "received",
            JobPhase::Downloading => "downloading",
            JobPhase::Validating => "validating",
            JobPhase::SkippedAlreadyEncoded => "skipped_already_encoded",
            JobPhase::Encoding => "encoding",
            JobPhase::EncodeFailed => "encode_failed",
            JobPhase::Encoded => "encoded",
            JobPhase::Uploading => "uploading",
            JobPhase::Delivered => "delivered",
            JobPhase::DeliveryFailed => "delivery_failed",
        }
    }

    /// Whether no further phase transition can occur.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobPhase::SkippedAlreadyEncoded
                | JobPhase::EncodeFailed
                | JobPhase::Delivered
                | JobPhase::DeliveryFailed
        )
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transcode-and-deliver request for a single submitted video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Per-upload identifier from the transport
    pub file_id: FileId,

    /// Temporary input path
    pub input_path: PathBuf,

    /// Derived temporary output path
    pub output_path: PathBuf,

    /// Total source duration in seconds; 0 means unknown/invalid.
    /// Immutable once set by validation.
    pub duration: f64,

    /// Source video codec name, empty if unknown
    pub codec: String,

    /// Current lifecycle phase
    pub phase: JobPhase,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last phase transition timestamp
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new job for an incoming upload.
    pub fn new(file_id: FileId, input_path: PathBuf, output_path: PathBuf) -> Self {
        let now = Utc::now();
        Self {
            file_id,
            input_path,
            output_path,
            duration: 0.0,
            codec: String::new(),
            phase: JobPhase::Received,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transition to a new phase. Transitions out of a terminal phase
    /// are ignored.
    pub fn advance(&mut self, phase: JobPhase) {
        if self.phase.is_terminal() {
            return;
        }
        self.phase = phase;
        self.updated_at = Utc::now();
    }

    /// Record the probed duration and codec. The duration is set once;
    /// later calls keep the original value.
    pub fn set_probe_result(&mut self, duration: f64, codec: impl Into<String>) {
        if self.duration == 0.0 {
            self.duration = duration.max(0.0);
        }
        self.codec = codec.into();
        self.updated_at = Utc::now();
    }
}
