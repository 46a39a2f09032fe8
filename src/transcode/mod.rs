//! Manifest transcoding
//!
//! The pipeline treats the media engine as a black box behind the
//! [`Transcoder`] trait:
//!
//! - [`FfmpegTranscoder`]: runs the external `ffmpeg` binary
//! - [`NoOpTranscoder`]: fails every item when no binary is available
//!
//! [`select_transcoder`] picks one from the configuration.

mod cli;
mod noop;
mod traits;

pub use cli::{EncodeSettings, FfmpegTranscoder};
pub use noop::NoOpTranscoder;
pub use traits::Transcoder;

use crate::config::TranscodeConfig;
use std::sync::Arc;

/// Build the transcoder described by the configuration
///
/// An explicit `ffmpeg_path` wins; otherwise `PATH` is searched when
/// `search_path` is set. Falls back to [`NoOpTranscoder`].
pub fn select_transcoder(config: &TranscodeConfig) -> Arc<dyn Transcoder> {
    let settings = EncodeSettings::from(config);
    let transcoder: Arc<dyn Transcoder> = if let Some(ref ffmpeg_path) = config.ffmpeg_path {
        Arc::new(FfmpegTranscoder::new(ffmpeg_path.clone()).with_settings(settings))
    } else if config.search_path {
        FfmpegTranscoder::from_path()
            .map(|t| Arc::new(t.with_settings(settings)) as Arc<dyn Transcoder>)
            .unwrap_or_else(|| Arc::new(NoOpTranscoder))
    } else {
        Arc::new(NoOpTranscoder)
    };

    if transcoder.name() == "noop" {
        tracing::warn!("ffmpeg not found, every item will fail to transcode");
    } else {
        tracing::info!(transcoder = transcoder.name(), "transcoder initialized");
    }
    transcoder
}
