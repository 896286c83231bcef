//! Per-job temp file lifecycle.
//!
//! Every job owns a [`JobFiles`] for its working paths. Cleanup runs
//! through `release_all`, and a `Drop` backstop covers exit paths that
//! never reach it (panics, early `?` returns).

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Working paths for one job, derived from its file identifier.
#[derive(Debug)]
pub struct JobFiles {
    input: PathBuf,
    output: PathBuf,
    released: bool,
}

impl JobFiles {
    /// Derive the input and output paths for `file_id` under `dir`.
    ///
    /// No files are created; paths are unique per upload because the
    /// identifier is.
    pub fn allocate(dir: &Path, file_id: &str) -> Self {
        Self {
            input: dir.join(format!("{file_id}.mp4")),
            output: dir.join(format!("{file_id}_encoded.mp4")),
            released: false,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Delete whatever exists of this job's files. Idempotent.
    pub async fn release_all(&mut self) {
        if self.released {
            return;
        }
        for path in [self.input.clone(), self.output.clone()] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!("Removed temp file {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
        self.released = true;
    }
}

impl Drop for JobFiles {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        for path in [&self.input, &self.output] {
            match std::fs::remove_file(path) {
                Ok(()) => debug!("Removed temp file {} on drop", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove {} on drop: {}", path.display(), e),
            }
        }
    }
}
