//! Telegram transport
//!
//! - [`TelegramChannel`] implements [`DeliveryChannel`] on top of the Bot API
//! - [`run_bot`] long-polls for updates and routes them to the pipeline

mod handler;

pub use handler::{BotState, run_bot};

use crate::config::BotConfig;
use crate::delivery::{DeliveryChannel, MessageHandle};
use crate::error::{DeliveryError, Result};
use async_trait::async_trait;
use std::path::Path;
use teloxide::payloads::SendVideoSetters;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, InputFile, MessageId};

/// Build a bot client from configuration
pub fn build_bot(config: &BotConfig) -> Bot {
    let bot = Bot::new(&config.token);
    match &config.api_url {
        Some(url) => bot.set_api_url(url.clone()),
        None => bot,
    }
}

/// Delivery channel bound to one conversation
///
/// Texts and progress messages go to `reply_chat` (where the list came from);
/// videos go to `video_chat`, which is the owner's chat or the same chat
/// depending on [`DeliveryTarget`](crate::config::DeliveryTarget).
#[derive(Clone)]
pub struct TelegramChannel {
    bot: Bot,
    reply_chat: ChatId,
    video_chat: ChatId,
    supports_streaming: bool,
}

impl TelegramChannel {
    /// Create a channel for one conversation
    pub fn new(bot: Bot, reply_chat: ChatId, video_chat: ChatId) -> Self {
        Self {
            bot,
            reply_chat,
            video_chat,
            supports_streaming: true,
        }
    }

    /// Whether uploaded videos are flagged as streamable
    pub fn with_streaming(mut self, supports_streaming: bool) -> Self {
        self.supports_streaming = supports_streaming;
        self
    }
}

#[async_trait]
impl DeliveryChannel for TelegramChannel {
    async fn send_text(&self, text: &str) -> Result<()> {
        self.bot.send_message(self.reply_chat, text).await?;
        Ok(())
    }

    async fn announce(&self, text: &str) -> Result<MessageHandle> {
        let message = self.bot.send_message(self.reply_chat, text).await?;
        Ok(MessageHandle {
            chat_id: message.chat.id.0,
            message_id: message.id.0,
        })
    }

    async fn retract(&self, handle: MessageHandle) -> Result<()> {
        self.bot
            .delete_message(ChatId(handle.chat_id), MessageId(handle.message_id))
            .await?;
        Ok(())
    }

    async fn send_video(&self, path: &Path, caption: &str) -> std::result::Result<(), DeliveryError> {
        if let Err(e) = tokio::fs::metadata(path).await {
            return Err(DeliveryError::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }

        self.bot
            .send_video(self.video_chat, InputFile::file(path.to_path_buf()))
            .caption(caption)
            .supports_streaming(self.supports_streaming)
            .await?;
        Ok(())
    }

    async fn indicate_upload(&self) -> Result<()> {
        self.bot
            .send_chat_action(self.video_chat, ChatAction::UploadVideo)
            .await?;
        Ok(())
    }
}
