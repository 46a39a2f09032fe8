//! Trait for the external transcode step

use crate::error::TranscodeError;
use async_trait::async_trait;
use std::path::Path;

/// Turns one manifest URL into one local media file
///
/// Implementations may be slow and may fail. They are not responsible for
/// removing partial output; the caller's workspace owns `output`.
///
/// # Examples
///
/// ```no_run
/// use manifest_dl::transcode::{FfmpegTranscoder, Transcoder};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let transcoder = FfmpegTranscoder::from_path().expect("ffmpeg not found");
/// transcoder
///     .transcode("https://cdn.example.com/live/index.m3u8", Path::new("/tmp/video_1.mp4"))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Read the manifest at `url` and write a single playable file to `output`
    ///
    /// An existing file at `output` is overwritten.
    ///
    /// # Errors
    ///
    /// Returns a [`TranscodeError`] if the tool cannot be started, exits
    /// unsuccessfully, or produces no file.
    async fn transcode(&self, url: &str, output: &Path) -> Result<(), TranscodeError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
