//! Incoming message dispatch and the per-job pipeline.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use hevcbot_media::{Encoder, Prober};
use hevcbot_models::{FileId, Job, JobOutcome, JobPhase};
use hevcbot_telegram::{Message, Transport, Video};
use tracing::{error, info};

use crate::config::MAX_FILE_SIZE;
use crate::delivery::{DeliveryCoordinator, DeliveryOutcome};
use crate::encode::{EncodeOrchestrator, EncodeOutcome};
use crate::error::WorkerResult;
use crate::files::JobFiles;
use crate::status::StatusMessage;

const WELCOME_TEXT: &str = "Welcome to the Video Encoder Bot! \u{1F3A5}\n\
    Send a video file (up to 2GB) or a video URL to compress it to HEVC (H.265).\n\
    Use /encode to start encoding manually.";

const ENCODE_PROMPT: &str = "Please send a video file to encode.";
const USAGE_PROMPT: &str = "Please send a video file or use /encode with a video.";

/// Handles one incoming message end to end.
///
/// Every error inside a job is contained here: a failed job replies
/// with its final status text and never takes the process down.
pub struct MessageHandler {
    transport: Arc<dyn Transport>,
    orchestrator: EncodeOrchestrator,
    delivery: DeliveryCoordinator,
    temp_dir: PathBuf,
}

impl MessageHandler {
    pub fn new(
        transport: Arc<dyn Transport>,
        prober: Arc<dyn Prober>,
        encoder: Arc<dyn Encoder>,
        temp_dir: PathBuf,
        poll_interval: Duration,
    ) -> Self {
        Self {
            orchestrator: EncodeOrchestrator::new(prober, encoder, poll_interval),
            delivery: DeliveryCoordinator::new(transport.clone()),
            transport,
            temp_dir,
        }
    }

    /// Dispatch one message: commands get a reply, videos get a job.
    pub async fn handle(&self, message: &Message) {
        let chat_id = message.chat.id;
        let message_id = message.message_id;

        if let Some(video) = &message.video {
            self.run_job(chat_id, message_id, video).await;
            return;
        }

        let reply = match message.text.as_deref() {
            Some(t) if t.starts_with("/start") => WELCOME_TEXT,
            Some(t) if t.starts_with("/encode") => ENCODE_PROMPT,
            _ => USAGE_PROMPT,
        };
        if let Err(e) = self.transport.send_message(chat_id, message_id, reply).await {
            error!("Reply failed in chat {}: {}", chat_id, e);
        }
    }

    /// Run the full pipeline for one submitted video.
    async fn run_job(&self, chat_id: i64, message_id: i64, video: &Video) {
        // Declared size is untrusted but large enough declarations are
        // rejected before anything touches the disk.
        if video.file_size.unwrap_or(0) > MAX_FILE_SIZE {
            let text = JobOutcome::OversizedDeclared.user_message();
            if let Err(e) = self.transport.send_message(chat_id, message_id, text).await {
                error!("Reply failed in chat {}: {}", chat_id, e);
            }
            return;
        }

        let status_ref = match self
            .transport
            .send_message(chat_id, message_id, "Downloading video...")
            .await
        {
            Ok(r) => r,
            Err(e) => {
                error!("Could not create status message in chat {}: {}", chat_id, e);
                return;
            }
        };
        let status = StatusMessage::new(self.transport.clone(), status_ref);

        let mut files = JobFiles::allocate(&self.temp_dir, &video.file_id);
        let mut job = Job::new(
            FileId::from_string(video.file_id.clone()),
            files.input().to_path_buf(),
            files.output().to_path_buf(),
        );
        info!("Job {} started in chat {}", job.file_id, chat_id);

        let outcome = match self
            .process(chat_id, message_id, &mut job, &files, &status)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Job {} failed: {}", job.file_id, e);
                JobOutcome::Unexpected
            }
        };
        job.advance(outcome.phase());

        files.release_all().await;
        status.set(outcome.user_message()).await;
        info!("Job {} finished: {:?}", job.file_id, outcome);
    }

    async fn process(
        &self,
        chat_id: i64,
        message_id: i64,
        job: &mut Job,
        files: &JobFiles,
        status: &StatusMessage,
    ) -> WorkerResult<JobOutcome> {
        job.advance(JobPhase::Downloading);
        self.transport
            .download_file(job.file_id.as_str(), files.input())
            .await?;
        status.set("Download complete. Checking video...").await;

        // The declared size gate above ran on sender-supplied data;
        // this one runs on what actually landed on disk.
        let actual_size = tokio::fs::metadata(files.input()).await?.len();
        if actual_size > MAX_FILE_SIZE {
            return Ok(JobOutcome::OversizedDownloaded);
        }

        match self.orchestrator.run(job, status).await {
            Ok(EncodeOutcome::Invalid) => return Ok(JobOutcome::InvalidVideo),
            Ok(EncodeOutcome::Skipped) => return Ok(JobOutcome::SkippedAlreadyEncoded),
            Ok(EncodeOutcome::Encoded) => {}
            Err(e) => {
                error!("Job {} encode error: {}", job.file_id, e);
                return Ok(JobOutcome::EncodeFailed);
            }
        }

        status.set("Encoding complete. Uploading...").await;
        job.advance(JobPhase::Uploading);
        let outcome = match self
            .delivery
            .deliver(chat_id, message_id, files.output(), "Encoded video (HEVC)")
            .await
        {
            DeliveryOutcome::Delivered => JobOutcome::Delivered,
            DeliveryOutcome::TooLarge => JobOutcome::DeliveryTooLarge,
            DeliveryOutcome::Failed => JobOutcome::DeliveryFailed,
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hevcbot_media::{MediaError, MediaResult, VideoInfo};
    use hevcbot_telegram::{Chat, MessageRef, TelegramError, TelegramResult};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    enum DownloadBehavior {
        /// Write these bytes to the destination
        Bytes(Vec<u8>),
        /// Create a sparse file of this length
        Sparse(u64),
        /// Fail without creating anything
        Fail,
    }

    struct MockTransport {
        download: DownloadBehavior,
        send_video_script: Mutex<Vec<Result<(), TelegramError>>>,
        replies: Mutex<Vec<String>>,
        edits: Mutex<Vec<String>>,
        uploads: AtomicUsize,
    }

    impl MockTransport {
        fn with_download(download: DownloadBehavior) -> Arc<Self> {
            Arc::new(Self {
                download,
                send_video_script: Mutex::new(vec![]),
                replies: Mutex::new(vec![]),
                edits: Mutex::new(vec![]),
                uploads: AtomicUsize::new(0),
            })
        }

        fn delivering(download: Vec<u8>) -> Arc<Self> {
            Self::with_download(DownloadBehavior::Bytes(download))
        }

        fn sparse_download(len: u64) -> Arc<Self> {
            Self::with_download(DownloadBehavior::Sparse(len))
        }

        fn failing_download() -> Arc<Self> {
            Self::with_download(DownloadBehavior::Fail)
        }

        fn with_video_script(
            download: Vec<u8>,
            script: Vec<Result<(), TelegramError>>,
        ) -> Arc<Self> {
            let transport = Self::with_download(DownloadBehavior::Bytes(download));
            *transport.send_video_script.lock().unwrap() = script;
            transport
        }

        fn last_edit(&self) -> Option<String> {
            self.edits.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn download_file(&self, _file_id: &str, dest: &Path) -> TelegramResult<()> {
            match &self.download {
                DownloadBehavior::Bytes(bytes) => {
                    tokio::fs::write(dest, bytes).await?;
                    Ok(())
                }
                DownloadBehavior::Sparse(len) => {
                    let file = tokio::fs::File::create(dest).await?;
                    file.set_len(*len).await?;
                    Ok(())
                }
                DownloadBehavior::Fail => Err(TelegramError::Api {
                    code: 400,
                    description: "file unavailable".to_string(),
                }),
            }
        }

        async fn send_message(
            &self,
            chat_id: i64,
            _reply_to: i64,
            text: &str,
        ) -> TelegramResult<MessageRef> {
            self.replies.lock().unwrap().push(text.to_string());
            Ok(MessageRef { chat_id, message_id: 99 })
        }

        async fn edit_message(&self, _msg: &MessageRef, text: &str) -> TelegramResult<()> {
            self.edits.lock().unwrap().push(text.to_string());
            Ok(())
        }

        async fn send_video(&self, _: i64, _: i64, _: &Path, _: &str) -> TelegramResult<()> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            let mut script = self.send_video_script.lock().unwrap();
            if script.is_empty() {
                Ok(())
            } else {
                script.remove(0)
            }
        }
    }

    struct StubProber {
        info: VideoInfo,
    }

    #[async_trait]
    impl Prober for StubProber {
        async fn probe(&self, path: &Path) -> VideoInfo {
            // The progress monitor probes the output, which may not
            // exist yet; report it as empty, like a lenient prober.
            if path.exists() {
                self.info.clone()
            } else {
                VideoInfo::default()
            }
        }
    }

    struct WritingEncoder {
        fail: bool,
    }

    #[async_trait]
    impl Encoder for WritingEncoder {
        async fn transcode(&self, _input: &Path, output: &Path) -> MediaResult<()> {
            if self.fail {
                return Err(MediaError::ffmpeg_failed(
                    "encoder exited with status 1",
                    Some("x265 error".to_string()),
                    Some(1),
                ));
            }
            tokio::fs::write(output, b"encoded").await?;
            Ok(())
        }
    }

    fn handler_with(
        transport: Arc<MockTransport>,
        info: VideoInfo,
        fail_encode: bool,
        temp_dir: PathBuf,
    ) -> MessageHandler {
        MessageHandler::new(
            transport,
            Arc::new(StubProber { info }),
            Arc::new(WritingEncoder { fail: fail_encode }),
            temp_dir,
            Duration::from_millis(10),
        )
    }

    fn video_message(file_id: &str, file_size: Option<u64>) -> Message {
        Message {
            message_id: 7,
            chat: Chat { id: 1001 },
            text: None,
            video: Some(Video {
                file_id: file_id.to_string(),
                file_size,
            }),
        }
    }

    fn text_message(text: &str) -> Message {
        Message {
            message_id: 7,
            chat: Chat { id: 1001 },
            text: Some(text.to_string()),
            video: None,
        }
    }

    fn h264_info() -> VideoInfo {
        VideoInfo { duration: 120.0, codec: "h264".to_string() }
    }

    fn assert_no_leftovers(dir: &Path) {
        let leftovers: Vec<_> = std::fs::read_dir(dir).unwrap().collect();
        assert!(leftovers.is_empty(), "leftover files: {leftovers:?}");
    }

    #[tokio::test]
    async fn test_start_command_gets_welcome() {
        let transport = MockTransport::delivering(vec![]);
        let dir = tempfile::tempdir().unwrap();
        let handler = handler_with(transport.clone(), h264_info(), false, dir.path().into());

        handler.handle(&text_message("/start")).await;
        let replies = transport.replies.lock().unwrap();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].starts_with("Welcome to the Video Encoder Bot!"));
    }

    #[tokio::test]
    async fn test_encode_without_video_prompts() {
        let transport = MockTransport::delivering(vec![]);
        let dir = tempfile::tempdir().unwrap();
        let handler = handler_with(transport.clone(), h264_info(), false, dir.path().into());

        handler.handle(&text_message("/encode")).await;
        assert_eq!(
            transport.replies.lock().unwrap().as_slice(),
            ["Please send a video file to encode."]
        );
    }

    #[tokio::test]
    async fn test_plain_text_gets_usage_prompt() {
        let transport = MockTransport::delivering(vec![]);
        let dir = tempfile::tempdir().unwrap();
        let handler = handler_with(transport.clone(), h264_info(), false, dir.path().into());

        handler.handle(&text_message("hello")).await;
        assert_eq!(
            transport.replies.lock().unwrap().as_slice(),
            ["Please send a video file or use /encode with a video."]
        );
    }

    #[tokio::test]
    async fn test_declared_oversize_rejected_without_creating_files() {
        let transport = MockTransport::delivering(vec![]);
        let dir = tempfile::tempdir().unwrap();
        let handler = handler_with(transport.clone(), h264_info(), false, dir.path().into());

        handler
            .handle(&video_message("big", Some(MAX_FILE_SIZE + 1)))
            .await;
        assert_eq!(
            transport.replies.lock().unwrap().as_slice(),
            ["Error: Video exceeds 2GB limit."]
        );
        assert_no_leftovers(dir.path());
    }

    #[tokio::test]
    async fn test_downloaded_oversize_rejected_and_cleaned() {
        // Declared size was within the limit but the transfer was not.
        let transport = MockTransport::sparse_download(MAX_FILE_SIZE + 1);
        let dir = tempfile::tempdir().unwrap();
        let handler = handler_with(transport.clone(), h264_info(), false, dir.path().into());

        handler.handle(&video_message("vid8", Some(1024))).await;

        assert_eq!(
            transport.last_edit().as_deref(),
            Some("Error: Downloaded video exceeds 2GB limit.")
        );
        assert_eq!(transport.uploads.load(Ordering::SeqCst), 0);
        assert_no_leftovers(dir.path());
    }

    #[tokio::test]
    async fn test_happy_path_delivers_and_cleans_up() {
        let transport = MockTransport::delivering(b"source bytes".to_vec());
        let dir = tempfile::tempdir().unwrap();
        let handler = handler_with(transport.clone(), h264_info(), false, dir.path().into());

        handler.handle(&video_message("vid1", Some(1024))).await;

        assert_eq!(transport.uploads.load(Ordering::SeqCst), 1);
        assert_eq!(transport.last_edit().as_deref(), Some("Upload complete!"));
        let edits = transport.edits.lock().unwrap();
        assert!(edits.contains(&"Download complete. Checking video...".to_string()));
        assert!(edits.contains(&"Encoding complete. Uploading...".to_string()));
        drop(edits);
        assert_no_leftovers(dir.path());
    }

    #[tokio::test]
    async fn test_already_hevc_skips_and_cleans_up() {
        let transport = MockTransport::delivering(b"source bytes".to_vec());
        let dir = tempfile::tempdir().unwrap();
        let info = VideoInfo { duration: 120.0, codec: "hevc".to_string() };
        let handler = handler_with(transport.clone(), info, false, dir.path().into());

        handler.handle(&video_message("vid2", Some(1024))).await;

        assert_eq!(transport.uploads.load(Ordering::SeqCst), 0);
        assert_eq!(
            transport.last_edit().as_deref(),
            Some("Video is already in HEVC format. No encoding needed.")
        );
        assert_no_leftovers(dir.path());
    }

    #[tokio::test]
    async fn test_invalid_video_reports_and_cleans_up() {
        let transport = MockTransport::delivering(b"not a video".to_vec());
        let dir = tempfile::tempdir().unwrap();
        let info = VideoInfo { duration: 0.0, codec: String::new() };
        let handler = handler_with(transport.clone(), info, false, dir.path().into());

        handler.handle(&video_message("vid3", Some(1024))).await;

        assert_eq!(transport.last_edit().as_deref(), Some("Error: Invalid video file."));
        assert_eq!(transport.uploads.load(Ordering::SeqCst), 0);
        assert_no_leftovers(dir.path());
    }

    #[tokio::test]
    async fn test_encode_failure_reports_and_cleans_up() {
        let transport = MockTransport::delivering(b"source bytes".to_vec());
        let dir = tempfile::tempdir().unwrap();
        let handler = handler_with(transport.clone(), h264_info(), true, dir.path().into());

        handler.handle(&video_message("vid4", Some(1024))).await;

        assert_eq!(
            transport.last_edit().as_deref(),
            Some("Error during encoding. Please try again.")
        );
        assert_eq!(transport.uploads.load(Ordering::SeqCst), 0);
        assert_no_leftovers(dir.path());
    }

    #[tokio::test]
    async fn test_delivery_too_large_reports_and_cleans_up() {
        let transport = MockTransport::with_video_script(
            b"source bytes".to_vec(),
            vec![Err(TelegramError::FileTooLarge)],
        );
        let dir = tempfile::tempdir().unwrap();
        let handler = handler_with(transport.clone(), h264_info(), false, dir.path().into());

        handler.handle(&video_message("vid5", Some(1024))).await;

        assert_eq!(
            transport.last_edit().as_deref(),
            Some("Error: Encoded video exceeds 2GB limit.")
        );
        assert_no_leftovers(dir.path());
    }

    #[tokio::test]
    async fn test_rate_limited_delivery_retries_then_delivers() {
        let transport = MockTransport::with_video_script(
            b"source bytes".to_vec(),
            vec![
                Err(TelegramError::RateLimited {
                    retry_after: Duration::from_millis(20),
                }),
                Ok(()),
            ],
        );
        let dir = tempfile::tempdir().unwrap();
        let handler = handler_with(transport.clone(), h264_info(), false, dir.path().into());

        handler.handle(&video_message("vid6", Some(1024))).await;

        assert_eq!(transport.uploads.load(Ordering::SeqCst), 2);
        assert_eq!(transport.last_edit().as_deref(), Some("Upload complete!"));
        assert_no_leftovers(dir.path());
    }

    #[tokio::test]
    async fn test_download_failure_is_contained() {
        let transport = MockTransport::failing_download();
        let dir = tempfile::tempdir().unwrap();
        let handler = handler_with(transport.clone(), h264_info(), false, dir.path().into());

        handler.handle(&video_message("vid7", Some(1024))).await;

        assert_eq!(
            transport.last_edit().as_deref(),
            Some("An error occurred. Please try again.")
        );
        assert_no_leftovers(dir.path());
    }
}
