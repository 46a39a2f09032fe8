//! # manifest-dl
//!
//! Batch downloader that turns a list of DASH (`.mpd`) and HLS (`.m3u8`)
//! manifest URLs into MP4 files and delivers them over a chat transport.
//!
//! ## Design
//!
//! - **Sequential** - one item at a time, in list order
//! - **Failure-isolating** - a broken URL or rejected upload only affects its own item
//! - **Self-cleaning** - every batch works in a scratch directory that is always removed
//! - **Event-driven** - consumers subscribe to batch events instead of polling
//!
//! The external transcoder and the chat transport both sit behind traits
//! ([`Transcoder`], [`DeliveryChannel`]), so the pipeline runs the same
//! against ffmpeg and Telegram as against test fakes.
//!
//! ## Quick Start
//!
//! ```no_run
//! use manifest_dl::{BatchPipeline, Config};
//! use manifest_dl::delivery::DeliveryChannel;
//!
//! # async fn example(channel: &dyn DeliveryChannel) -> manifest_dl::Result<()> {
//! let pipeline = BatchPipeline::from_config(Config::default());
//!
//! let mut events = pipeline.subscribe();
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         println!("Event: {:?}", event);
//!     }
//! });
//!
//! let list = b"https://cdn.example.com/a/manifest.mpd\nnot a url\n";
//! let report = pipeline.submit(list, channel).await?;
//! assert_eq!(report.total(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Sender authorization
pub mod auth;
/// Configuration types
pub mod config;
/// Outbound messaging seam
pub mod delivery;
/// Error types
pub mod error;
/// Recipient-facing texts
pub mod messages;
/// Batch pipeline controller
pub mod pipeline;
/// Telegram front-end
pub mod telegram;
/// External transcoder handling
pub mod transcode;
/// Core types and events
pub mod types;
/// URL list parsing
pub mod urls;

// Re-export commonly used types
pub use auth::{Authorizer, OwnerOnly};
pub use config::{BotConfig, Config, DeliveryConfig, DeliveryTarget, TranscodeConfig, WorkspaceConfig};
pub use delivery::{DeliveryChannel, MessageHandle};
pub use error::{DeliveryError, Error, Result, TranscodeError};
pub use pipeline::BatchPipeline;
pub use telegram::{TelegramChannel, run_bot};
pub use transcode::{FfmpegTranscoder, NoOpTranscoder, Transcoder};
pub use types::{BatchId, BatchReport, Event, ItemOutcome, ItemResult, ItemState, Stage};

/// Wait for SIGTERM or SIGINT
///
/// Falls back to whichever signal can be registered, and to `ctrl_c` when
/// neither can (restricted containers).
#[cfg(unix)]
pub(crate) async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                _ = sigint.recv() => tracing::info!("Received SIGINT signal (Ctrl+C)"),
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
pub(crate) async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C signal"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C signal"),
    }
}
