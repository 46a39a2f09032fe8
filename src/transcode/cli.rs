//! CLI-based transcoder using an external ffmpeg binary

use super::traits::Transcoder;
use crate::config::TranscodeConfig;
use crate::error::TranscodeError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Maximum number of stderr bytes kept in a [`TranscodeError::Failed`]
const STDERR_TAIL_BYTES: usize = 2048;

/// Encoder settings passed to ffmpeg
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeSettings {
    /// Video encoder (`-c:v`)
    pub video_codec: String,
    /// Audio encoder (`-c:a`)
    pub audio_codec: String,
    /// Speed preset (`-preset`)
    pub preset: String,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self::from(&TranscodeConfig::default())
    }
}

impl From<&TranscodeConfig> for EncodeSettings {
    fn from(config: &TranscodeConfig) -> Self {
        Self {
            video_codec: config.video_codec.clone(),
            audio_codec: config.audio_codec.clone(),
            preset: config.preset.clone(),
        }
    }
}

/// Transcoder that runs the external `ffmpeg` binary
///
/// Each call runs `ffmpeg -hide_banner -loglevel error -i <url> -c:v <codec>
/// -c:a <codec> -preset <preset> -y <output>`. The child is killed if the
/// returned future is dropped, so an enclosing timeout does not leak processes.
///
/// # Examples
///
/// ```no_run
/// use manifest_dl::transcode::{FfmpegTranscoder, Transcoder};
/// use std::path::{Path, PathBuf};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Create with explicit path
/// let transcoder = FfmpegTranscoder::new(PathBuf::from("/usr/bin/ffmpeg"));
///
/// // Or auto-discover from PATH
/// let transcoder = FfmpegTranscoder::from_path()
///     .expect("ffmpeg not found in PATH");
///
/// transcoder
///     .transcode("https://cdn.example.com/dash/manifest.mpd", Path::new("video_1.mp4"))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct FfmpegTranscoder {
    binary_path: PathBuf,
    settings: EncodeSettings,
}

impl FfmpegTranscoder {
    /// Create a transcoder with an explicit binary path and default settings
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            settings: EncodeSettings::default(),
        }
    }

    /// Attempt to find ffmpeg in PATH
    ///
    /// Returns `None` if the binary is not found.
    pub fn from_path() -> Option<Self> {
        which::which("ffmpeg").ok().map(Self::new)
    }

    /// Replace the encoder settings
    pub fn with_settings(mut self, settings: EncodeSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Path of the binary this transcoder runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Build the ffmpeg argument list for one item
    pub fn build_args(&self, url: &str, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-loglevel",
            "error",
            "-i",
            url,
            "-c:v",
            self.settings.video_codec.as_str(),
            "-c:a",
            self.settings.audio_codec.as_str(),
            "-preset",
            self.settings.preset.as_str(),
            "-y",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(output.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, url: &str, output: &Path) -> Result<(), TranscodeError> {
        let result = Command::new(&self.binary_path)
            .args(self.build_args(url, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TranscodeError::Launch {
                tool: self.binary_path.display().to_string(),
                reason: e.to_string(),
            })?;

        if !result.status.success() {
            return Err(TranscodeError::Failed {
                code: result.status.code(),
                stderr: stderr_tail(&result.stderr),
            });
        }

        if tokio::fs::metadata(output).await.is_err() {
            return Err(TranscodeError::MissingOutput(output.to_path_buf()));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

/// Last few KiB of the tool's stderr, trimmed, on a char boundary
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.len() <= STDERR_TAIL_BYTES {
        return text.to_string();
    }
    let mut start = text.len() - STDERR_TAIL_BYTES;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].to_string()
}
