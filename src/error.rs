//! Error types for manifest-dl
//!
//! Errors are split by how far they are allowed to travel:
//! - [`Error`] is the crate-wide error. It aborts a batch (or never lets one start).
//! - [`TranscodeError`] and [`DeliveryError`] belong to a single item. The
//!   pipeline turns them into an [`ItemOutcome`](crate::types::ItemOutcome) and
//!   moves on to the next URL.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for manifest-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for manifest-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "bot.token")
        key: Option<String>,
    },

    /// The submitted list contained no `.mpd`/`.m3u8` URLs
    #[error("no valid mpd or m3u8 URLs found")]
    NoValidUrls,

    /// I/O error (workspace creation, config file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Telegram Bot API request failed
    #[error("telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Downloading an input file from Telegram failed
    #[error("telegram download error: {0}")]
    TelegramDownload(#[from] teloxide::DownloadError),

    /// Messaging transport failed for a non-Telegram channel
    #[error("transport error: {0}")]
    Transport(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::NoValidUrls => "no_valid_urls",
            Error::Io(_) => "io_error",
            Error::Telegram(_) => "telegram_error",
            Error::TelegramDownload(_) => "telegram_download_error",
            Error::Transport(_) => "transport_error",
            Error::Serialization(_) => "serialization_error",
        }
    }
}

/// Failure of the transcode step for one item
///
/// The display text is logged, never shown to the recipient.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The tool could not be started at all
    #[error("failed to execute {tool}: {reason}")]
    Launch {
        /// Path or name of the binary that failed to start
        tool: String,
        /// The OS error
        reason: String,
    },

    /// The tool ran and exited unsuccessfully
    #[error("transcoder exited with {}: {stderr}", exit_code_label(.code))]
    Failed {
        /// Exit code, `None` when killed by a signal
        code: Option<i32>,
        /// Tail of the tool's error output
        stderr: String,
    },

    /// The tool reported success but produced no file
    #[error("transcoder produced no output at {}", .0.display())]
    MissingOutput(PathBuf),

    /// The per-item transcode timeout expired
    #[error("transcode timed out after {0:?}")]
    TimedOut(Duration),

    /// No transcoder is available
    #[error("not supported: {0}")]
    NotSupported(String),
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Failure of the delivery step for one item
///
/// The display text is surfaced to the recipient in the failure notice.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The transport refused or failed to transmit the file
    #[error("{0}")]
    Rejected(String),

    /// The produced file could not be read
    #[error("cannot read {}: {reason}", .path.display())]
    Unreadable {
        /// The file that could not be read
        path: PathBuf,
        /// The reason reading failed
        reason: String,
    },

    /// The per-item delivery timeout expired
    #[error("upload timed out after {0:?}")]
    TimedOut(Duration),
}

impl From<teloxide::RequestError> for DeliveryError {
    fn from(error: teloxide::RequestError) -> Self {
        DeliveryError::Rejected(error.to_string())
    }
}
