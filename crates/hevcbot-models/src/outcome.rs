//! Terminal job outcomes and their user-visible status text.
//!
//! Every job ends in exactly one of these, and each maps to exactly
//! one final status message. Internal diagnostics (encoder stderr,
//! transport errors) are logged server-side and never appear here.

use serde::{Deserialize, Serialize};

use crate::job::JobPhase;

/// Terminal classification of a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    /// Encoded artifact was delivered to the user
    Delivered,
    /// Source was already in the target codec
    SkippedAlreadyEncoded,
    /// Declared size exceeded the limit before any transfer
    OversizedDeclared,
    /// Actual on-disk size exceeded the limit after transfer
    OversizedDownloaded,
    /// Probing found no usable duration
    InvalidVideo,
    /// Encoder exited non-zero or the encode phase errored
    EncodeFailed,
    /// Transport rejected the artifact as too large
    DeliveryTooLarge,
    /// Any other delivery failure, including exhausted rate-limit retry
    DeliveryFailed,
    /// Catch-all for errors outside the classified paths
    Unexpected,
}

impl JobOutcome {
    /// The single final status text shown to the user for this outcome.
    pub fn user_message(&self) -> &'static str {
        match self {
            JobOutcome::Delivered => "Upload complete!",
            JobOutcome::SkippedAlreadyEncoded => {
                "Video is already in HEVC format. No encoding needed."
            }
            JobOutcome::OversizedDeclared => "Error: Video exceeds 2GB limit.",
            JobOutcome::OversizedDownloaded => "Error: Downloaded video exceeds 2GB limit.",
            JobOutcome::InvalidVideo => "Error: Invalid video file.",
            JobOutcome::EncodeFailed => "Error during encoding. Please try again.",
            JobOutcome::DeliveryTooLarge => "Error: Encoded video exceeds 2GB limit.",
            JobOutcome::DeliveryFailed => {
                "Error: Could not deliver the encoded video. Please try again."
            }
            JobOutcome::Unexpected => "An error occurred. Please try again.",
        }
    }

    /// The terminal phase a job lands in for this outcome.
    pub fn phase(&self) -> JobPhase {
        match self {
            JobOutcome::Delivered => JobPhase::Delivered,
            JobOutcome::SkippedAlreadyEncoded => JobPhase::SkippedAlreadyEncoded,
            JobOutcome::OversizedDeclared
            | JobOutcome::OversizedDownloaded
            | JobOutcome::InvalidVideo
            | JobOutcome::EncodeFailed
            | JobOutcome::Unexpected => JobPhase::EncodeFailed,
            JobOutcome::DeliveryTooLarge | JobOutcome::DeliveryFailed => JobPhase::DeliveryFailed,
        }
    }

    /// Whether the outcome represents completed or intentionally
    /// skipped work rather than a failure.
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Delivered | JobOutcome::SkippedAlreadyEncoded)
    }
}
