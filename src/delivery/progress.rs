//! Per-item progress messages

use super::{DeliveryChannel, MessageHandle};
use crate::error::Result;
use tracing::{debug, warn};

/// Posts one status message per item and removes it once the item is done
///
/// Retraction is best-effort: a message that is already gone (or a transport
/// hiccup while deleting it) is logged and otherwise ignored.
pub struct ProgressReporter<'a> {
    channel: &'a dyn DeliveryChannel,
}

impl<'a> ProgressReporter<'a> {
    /// Create a reporter on top of a channel
    pub fn new(channel: &'a dyn DeliveryChannel) -> Self {
        Self { channel }
    }

    /// Post a status message
    pub async fn announce(&self, text: &str) -> Result<MessageHandle> {
        let handle = self.channel.announce(text).await?;
        debug!(
            chat_id = handle.chat_id,
            message_id = handle.message_id,
            "progress message posted"
        );
        Ok(handle)
    }

    /// Remove a status message, swallowing failures
    pub async fn retract(&self, handle: MessageHandle) {
        if let Err(e) = self.channel.retract(handle).await {
            warn!(
                chat_id = handle.chat_id,
                message_id = handle.message_id,
                error = %e,
                "failed to retract progress message"
            );
        }
    }
}
