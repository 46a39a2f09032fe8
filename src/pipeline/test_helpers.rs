//! Shared fakes for pipeline unit tests

use crate::config::Config;
use crate::delivery::{DeliveryChannel, MessageHandle};
use crate::error::{DeliveryError, Error, Result, TranscodeError};
use crate::transcode::Transcoder;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

/// Transcoder that writes a stub file, optionally after a delay
#[derive(Default)]
pub(crate) struct StubTranscoder {
    pub(crate) delay: Option<Duration>,
}

#[async_trait]
impl Transcoder for StubTranscoder {
    async fn transcode(&self, _url: &str, output: &Path) -> std::result::Result<(), TranscodeError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        tokio::fs::write(output, b"mp4").await.map_err(|e| TranscodeError::Launch {
            tool: "stub".to_string(),
            reason: e.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Channel that keeps texts, stalls uploads on request and fails the activity indicator
#[derive(Default)]
pub(crate) struct MemoryChannel {
    pub(crate) upload_delay: Option<Duration>,
    pub(crate) texts: Mutex<Vec<String>>,
    pub(crate) videos: Mutex<Vec<String>>,
}

#[async_trait]
impl DeliveryChannel for MemoryChannel {
    async fn send_text(&self, text: &str) -> Result<()> {
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn announce(&self, _text: &str) -> Result<MessageHandle> {
        Ok(MessageHandle {
            chat_id: 1,
            message_id: 1,
        })
    }

    async fn retract(&self, _handle: MessageHandle) -> Result<()> {
        Ok(())
    }

    async fn send_video(&self, _path: &Path, caption: &str) -> std::result::Result<(), DeliveryError> {
        if let Some(delay) = self.upload_delay {
            tokio::time::sleep(delay).await;
        }
        self.videos.lock().unwrap().push(caption.to_string());
        Ok(())
    }

    async fn indicate_upload(&self) -> Result<()> {
        Err(Error::Transport("chat action not allowed".to_string()))
    }
}

/// Configuration with workspaces inside a fresh temp directory
///
/// The returned `TempDir` must be kept alive for the duration of the test.
pub(crate) fn create_test_config() -> (Config, TempDir) {
    let parent = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.workspace.parent_dir = Some(parent.path().to_path_buf());
    (config, parent)
}
