//! Encode orchestration.

use std::sync::Arc;
use std::time::Duration;

use hevcbot_media::{Encoder, Prober, TARGET_CODEC};
use hevcbot_models::{Job, JobPhase};
use tracing::{error, info};

use crate::error::WorkerResult;
use crate::monitor::ProgressMonitor;
use crate::status::StatusMessage;

/// How a downloaded input left the encode phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeOutcome {
    /// A new output file was produced
    Encoded,
    /// Source already in the target codec; encoder never invoked
    Skipped,
    /// Probing found no usable duration; encoder never invoked
    Invalid,
}

/// Runs validation, the encoder, and the progress reporter for one job.
pub struct EncodeOrchestrator {
    prober: Arc<dyn Prober>,
    encoder: Arc<dyn Encoder>,
    poll_interval: Duration,
}

impl EncodeOrchestrator {
    pub fn new(
        prober: Arc<dyn Prober>,
        encoder: Arc<dyn Encoder>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            prober,
            encoder,
            poll_interval,
        }
    }

    /// Validate the job's input and, if it needs encoding, transcode
    /// it while reporting progress through `status`.
    ///
    /// The progress reporter is always stopped before the encoder's
    /// result is inspected, so no stale progress edit can land after a
    /// terminal status.
    pub async fn run(
        &self,
        job: &mut Job,
        status: &StatusMessage,
    ) -> WorkerResult<EncodeOutcome> {
        job.advance(JobPhase::Validating);
        let info = self.prober.probe(&job.input_path).await;
        job.set_probe_result(info.duration, info.codec);

        if job.duration <= 0.0 {
            info!("No usable duration for {}", job.file_id);
            return Ok(EncodeOutcome::Invalid);
        }
        if job.codec == TARGET_CODEC {
            info!("{} already {}", job.file_id, TARGET_CODEC);
            return Ok(EncodeOutcome::Skipped);
        }

        status.set("Encoding started...").await;
        job.advance(JobPhase::Encoding);
        let monitor = ProgressMonitor::spawn(
            self.prober.clone(),
            job.output_path.clone(),
            job.duration,
            status.clone(),
            self.poll_interval,
        );

        let result = self.encoder.transcode(&job.input_path, &job.output_path).await;
        monitor.stop().await;

        match result {
            Ok(()) => {
                job.advance(JobPhase::Encoded);
                info!("Encoded {} in {:.1}s of source", job.file_id, job.duration);
                Ok(EncodeOutcome::Encoded)
            }
            Err(e) => {
                // Full encoder diagnostics stay in the logs.
                error!("Encode failed for {}: {}", job.file_id, e);
                Err(e.into())
            }
        }
    }
}
