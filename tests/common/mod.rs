//! Common test utilities for manifest-dl integration tests
//!
//! - [`FakeTranscoder`] writes a small file per URL and fails chosen URLs
//! - [`RecordingChannel`] records everything the pipeline sends, in order

#![allow(dead_code)]

use async_trait::async_trait;
use manifest_dl::delivery::{DeliveryChannel, MessageHandle};
use manifest_dl::error::{DeliveryError, Error, Result, TranscodeError};
use manifest_dl::transcode::Transcoder;
use manifest_dl::{BatchPipeline, Config};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Content written for every successful transcode
pub const FAKE_VIDEO: &[u8] = b"\x00\x00\x00\x18ftypmp42";

/// Transcoder that succeeds unless the URL contains a failing marker
#[derive(Default)]
pub struct FakeTranscoder {
    failing: Vec<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, PathBuf)>>,
}

impl FakeTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every URL containing `marker`
    pub fn failing_on(mut self, marker: &str) -> Self {
        self.failing.push(marker.to_string());
        self
    }

    /// Sleep before producing output
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// `(url, output)` of every invocation, in order
    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, url: &str, output: &Path) -> std::result::Result<(), TranscodeError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), output.to_path_buf()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.iter().any(|marker| url.contains(marker.as_str())) {
            // Leave a partial file behind like a real tool would
            tokio::fs::write(output, b"partial").await.ok();
            return Err(TranscodeError::Failed {
                code: Some(1),
                stderr: format!("{url}: Invalid data found when processing input"),
            });
        }

        tokio::fs::write(output, FAKE_VIDEO)
            .await
            .map_err(|e| TranscodeError::Launch {
                tool: "fake".to_string(),
                reason: e.to_string(),
            })
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// One thing the pipeline sent, in the order it was sent
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sent {
    Text(String),
    Progress { message_id: i32, text: String },
    Retract { message_id: i32 },
    Video {
        path: PathBuf,
        caption: String,
        file_existed: bool,
    },
    UploadAction,
}

/// Delivery channel that records every call
pub struct RecordingChannel {
    log: Mutex<Vec<Sent>>,
    next_message_id: AtomicI32,
    failing_videos: Vec<usize>,
    fail_texts: bool,
    fail_retracts: bool,
}

impl Default for RecordingChannel {
    fn default() -> Self {
        Self {
            log: Mutex::new(Vec::new()),
            next_message_id: AtomicI32::new(100),
            failing_videos: Vec::new(),
            fail_texts: false,
            fail_retracts: false,
        }
    }
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the upload of item `index` (1-based)
    pub fn rejecting_video(mut self, index: usize) -> Self {
        self.failing_videos.push(index);
        self
    }

    /// Fail every plain text message, as if the transport were down
    pub fn failing_texts(mut self) -> Self {
        self.fail_texts = true;
        self
    }

    /// Fail every retraction
    pub fn failing_retracts(mut self) -> Self {
        self.fail_retracts = true;
        self
    }

    pub fn log(&self) -> Vec<Sent> {
        self.log.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Text(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn video_captions(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Video { caption, .. } => Some(caption),
                _ => None,
            })
            .collect()
    }

    fn record(&self, sent: Sent) {
        self.log.lock().unwrap().push(sent);
    }

    fn rejects(&self, caption: &str) -> bool {
        self.failing_videos
            .iter()
            .any(|index| caption.contains(&format!("Video {index} of")))
    }
}

#[async_trait]
impl DeliveryChannel for RecordingChannel {
    async fn send_text(&self, text: &str) -> Result<()> {
        if self.fail_texts {
            return Err(Error::Transport("connection reset".to_string()));
        }
        self.record(Sent::Text(text.to_string()));
        Ok(())
    }

    async fn announce(&self, text: &str) -> Result<MessageHandle> {
        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        self.record(Sent::Progress {
            message_id,
            text: text.to_string(),
        });
        Ok(MessageHandle {
            chat_id: 7,
            message_id,
        })
    }

    async fn retract(&self, handle: MessageHandle) -> Result<()> {
        if self.fail_retracts {
            return Err(Error::Transport("message can't be deleted".to_string()));
        }
        self.record(Sent::Retract {
            message_id: handle.message_id,
        });
        Ok(())
    }

    async fn send_video(&self, path: &Path, caption: &str) -> std::result::Result<(), DeliveryError> {
        self.record(Sent::Video {
            path: path.to_path_buf(),
            caption: caption.to_string(),
            file_existed: path.is_file(),
        });
        if self.rejects(caption) {
            return Err(DeliveryError::Rejected(
                "Bad Request: Request Entity Too Large".to_string(),
            ));
        }
        Ok(())
    }

    async fn indicate_upload(&self) -> Result<()> {
        self.record(Sent::UploadAction);
        Ok(())
    }
}

/// Configuration whose workspaces are created under `parent`
pub fn test_config(parent: &Path) -> Config {
    let mut config = Config::default();
    config.bot.token = "123:test".to_string();
    config.bot.owner_id = 7;
    config.workspace.parent_dir = Some(parent.to_path_buf());
    config
}

/// Pipeline over a fresh temp parent directory
pub fn pipeline_with(transcoder: FakeTranscoder) -> (BatchPipeline, Arc<FakeTranscoder>, TempDir) {
    let parent = tempfile::tempdir().unwrap();
    let transcoder = Arc::new(transcoder);
    let pipeline = BatchPipeline::new(
        Arc::new(test_config(parent.path())),
        transcoder.clone(),
    );
    (pipeline, transcoder, parent)
}

/// Owned URL list
pub fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|url| url.to_string()).collect()
}

/// Entries left in a directory
pub fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
