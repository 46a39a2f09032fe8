//! Outbound messaging
//!
//! [`DeliveryChannel`] is everything the pipeline needs from a chat transport:
//! plain texts, retractable progress messages and video uploads. The Telegram
//! implementation lives in [`crate::telegram`]; tests substitute recording fakes.

mod progress;

pub use progress::ProgressReporter;

use crate::error::{DeliveryError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Reference to a sent message that can later be deleted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle {
    /// Chat the message was posted in
    pub chat_id: i64,
    /// Message id within that chat
    pub message_id: i32,
}

/// Transport used by the pipeline to talk to the recipient
///
/// Errors from [`send_text`](DeliveryChannel::send_text) and
/// [`announce`](DeliveryChannel::announce) mean the transport itself is
/// unavailable and abort the batch. [`send_video`](DeliveryChannel::send_video)
/// failures stay local to one item.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Send a plain text message
    async fn send_text(&self, text: &str) -> Result<()>;

    /// Send a message that will be retracted later
    async fn announce(&self, text: &str) -> Result<MessageHandle>;

    /// Delete a previously announced message
    async fn retract(&self, handle: MessageHandle) -> Result<()>;

    /// Upload a produced video with a caption
    async fn send_video(&self, path: &Path, caption: &str) -> std::result::Result<(), DeliveryError>;

    /// Show an "uploading video" activity indicator, if the transport has one
    async fn indicate_upload(&self) -> Result<()> {
        Ok(())
    }
}
