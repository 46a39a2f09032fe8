//! No-op transcoder used when ffmpeg is unavailable

use super::traits::Transcoder;
use crate::error::TranscodeError;
use async_trait::async_trait;
use std::path::Path;

/// Transcoder that fails every item with [`TranscodeError::NotSupported`]
///
/// Lets the bot keep running (and report a per-item failure for every URL)
/// when no ffmpeg binary is configured or found on `PATH`.
///
/// # Examples
///
/// ```
/// use manifest_dl::transcode::{NoOpTranscoder, Transcoder};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() {
/// let result = NoOpTranscoder
///     .transcode("https://cdn.example.com/a.mpd", Path::new("video_1.mp4"))
///     .await;
/// assert!(result.is_err());
/// # }
/// ```
pub struct NoOpTranscoder;

#[async_trait]
impl Transcoder for NoOpTranscoder {
    async fn transcode(&self, _url: &str, _output: &Path) -> Result<(), TranscodeError> {
        Err(TranscodeError::NotSupported(
            "transcoding requires an ffmpeg binary. \
             Configure transcode.ffmpeg_path or ensure ffmpeg is in PATH."
                .into(),
        ))
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
