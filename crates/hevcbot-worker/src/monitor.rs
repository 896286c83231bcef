//! Live encode progress reporting.
//!
//! A background task probes the growing output file on a fixed cadence
//! and rewrites the job's status message with a percentage. The task is
//! purely observational: it never touches job state, and every probe
//! failure is swallowed, so a broken progress read can not fail an
//! otherwise healthy encode.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use hevcbot_media::Prober;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::status::StatusMessage;

/// Handle to a running progress reporter.
pub struct ProgressMonitor {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ProgressMonitor {
    /// Start reporting progress for the encode writing `output`.
    ///
    /// `total_duration` is the source duration in seconds; zero means
    /// the total is unknown and only an indeterminate text is shown.
    pub fn spawn(
        prober: Arc<dyn Prober>,
        output: PathBuf,
        total_duration: f64,
        status: StatusMessage,
        interval: Duration,
    ) -> Self {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so the encoder
            // gets a head start before the first probe.
            ticker.tick().await;

            let mut last_pct: u32 = 0;
            loop {
                tokio::select! {
                    _ = stop_rx.changed() => {
                        debug!("Progress monitor stopping for {}", output.display());
                        break;
                    }
                    _ = ticker.tick() => {
                        if total_duration <= 0.0 {
                            status.set("Encoding in progress...").await;
                            continue;
                        }
                        let info = prober.probe(&output).await;
                        let pct = (100.0 * info.duration / total_duration)
                            .clamp(0.0, 100.0) as u32;
                        // Stalled or failed probes must not walk the
                        // reported number backwards.
                        last_pct = last_pct.max(pct);
                        status.set(&format!("Encoding: {last_pct}% complete")).await;
                    }
                }
            }
        });

        Self { stop_tx, handle }
    }

    /// Signal the reporter to stop and wait for it to finish.
    ///
    /// After this returns no further status edits will be issued, so
    /// the caller may safely delete the output file.
    pub async fn stop(self) {
        self.stop_tx.send(true).ok();
        self.handle.await.ok();
    }
}
