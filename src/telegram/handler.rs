//! Update routing for the Telegram bot

use super::{TelegramChannel, build_bot};
use crate::auth::{Authorizer, OwnerOnly};
use crate::config::{Config, DeliveryTarget};
use crate::error::{Error, Result};
use crate::messages;
use crate::pipeline::BatchPipeline;
use crate::urls;
use std::sync::Arc;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{Document, UserId};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// What an incoming message asks for
#[derive(Debug)]
enum Incoming<'a> {
    Start,
    UrlList(&'a Document),
    /// Plain text that is not a command
    Text,
    /// Media, service messages and commands other than `/start`
    Ignored,
}

impl<'a> Incoming<'a> {
    fn classify(msg: &'a Message) -> Self {
        if let Some(document) = msg.document() {
            return Incoming::UrlList(document);
        }
        match msg.text() {
            Some(text) if is_start_command(text) => Incoming::Start,
            Some(text) if text.starts_with('/') => Incoming::Ignored,
            Some(_) => Incoming::Text,
            None => Incoming::Ignored,
        }
    }
}

/// `/start`, optionally addressed (`/start@MyBot`) or with a deep-link payload
fn is_start_command(text: &str) -> bool {
    text.split_whitespace()
        .next()
        .and_then(|cmd| cmd.split('@').next())
        .is_some_and(|cmd| cmd == "/start")
}

/// Shared state injected into every handler invocation
pub struct BotState {
    config: Arc<Config>,
    pipeline: BatchPipeline,
    authorizer: Arc<dyn Authorizer>,
    batch_lock: Mutex<()>,
}

impl BotState {
    /// Create the state with an explicit pipeline and authorizer
    pub fn new(
        config: Arc<Config>,
        pipeline: BatchPipeline,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            config,
            pipeline,
            authorizer,
            batch_lock: Mutex::new(()),
        }
    }

    /// Owner-only state built from configuration
    pub fn from_config(config: Arc<Config>) -> Self {
        let pipeline = BatchPipeline::from_config(config.clone());
        let authorizer = Arc::new(OwnerOnly::new(config.bot.owner_id));
        Self::new(config, pipeline, authorizer)
    }

    /// The pipeline batches run on
    pub fn pipeline(&self) -> &BatchPipeline {
        &self.pipeline
    }

    fn video_chat(&self, msg: &Message) -> ChatId {
        match self.config.bot.delivery_target {
            DeliveryTarget::Owner => ChatId::from(UserId(self.config.bot.owner_id)),
            DeliveryTarget::Sender => msg.chat.id,
        }
    }
}

/// Run the bot until SIGTERM or Ctrl+C
///
/// Updates are long-polled. Batches run one at a time; a list sent while
/// another batch is running waits for it to finish. On a signal the
/// dispatcher stops taking updates and lets the running handler finish.
pub async fn run_bot(config: Config) -> Result<()> {
    config.validate()?;
    let config = Arc::new(config);
    let bot = build_bot(&config.bot);

    let me = bot.get_me().await?;
    info!(
        username = me.username.as_deref().unwrap_or("<none>"),
        owner_id = config.bot.owner_id,
        delivery_target = ?config.bot.delivery_target,
        "bot started and polling"
    );

    let state = Arc::new(BotState::from_config(config));
    let handler = Update::filter_message().endpoint(handle_message);

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build();

    let shutdown = dispatcher.shutdown_token();
    tokio::spawn(async move {
        crate::wait_for_signal().await;
        match shutdown.shutdown() {
            Ok(stopped) => stopped.await,
            Err(e) => warn!(error = %e, "dispatcher was not running at shutdown"),
        }
    });

    dispatcher.dispatch().await;

    info!("bot stopped");
    Ok(())
}

async fn handle_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let incoming = Incoming::classify(&msg);
    if matches!(incoming, Incoming::Ignored) {
        debug!(chat_id = msg.chat.id.0, message_id = msg.id.0, "ignoring message");
        return Ok(());
    }

    let sender = msg.from.as_ref().map(|user| user.id.0);
    if !state.authorizer.check(sender) {
        warn!(sender = ?sender, chat_id = msg.chat.id.0, "unauthorized message rejected");
        bot.send_message(msg.chat.id, messages::UNAUTHORIZED).await?;
        return Ok(());
    }

    match incoming {
        Incoming::Start => {
            bot.send_message(msg.chat.id, messages::WELCOME).await?;
        }
        Incoming::Text => {
            bot.send_message(msg.chat.id, messages::USAGE_HINT).await?;
        }
        Incoming::UrlList(document) => {
            handle_url_list(&bot, &msg, document, &state).await?;
        }
        Incoming::Ignored => {}
    }
    Ok(())
}

async fn handle_url_list(
    bot: &Bot,
    msg: &Message,
    document: &Document,
    state: &BotState,
) -> ResponseResult<()> {
    let file_name = document.file_name.as_deref().unwrap_or_default();
    if !urls::is_text_file_name(file_name) {
        bot.send_message(msg.chat.id, messages::NOT_A_TEXT_FILE).await?;
        return Ok(());
    }

    let input = match receive_input_file(bot, document).await {
        Ok(input) => input,
        Err(e) => {
            warn!(file_name, error = %e, "failed to fetch URL list");
            bot.send_message(msg.chat.id, messages::INPUT_UNAVAILABLE).await?;
            return Ok(());
        }
    };

    let channel = TelegramChannel::new(bot.clone(), msg.chat.id, state.video_chat(msg))
        .with_streaming(state.config.delivery.supports_streaming);

    let _guard = state.batch_lock.lock().await;
    match state.pipeline.submit(&input, &channel).await {
        Ok(report) => {
            info!(
                batch_id = %report.id,
                delivered = report.delivered(),
                failed = report.failed(),
                "batch finished"
            );
        }
        Err(Error::NoValidUrls) => {}
        Err(Error::Telegram(e)) => {
            error!(error = %e, "batch aborted by transport error");
            return Err(e);
        }
        Err(e) => {
            error!(error = %e, "batch aborted");
        }
    }
    Ok(())
}

async fn receive_input_file(bot: &Bot, document: &Document) -> Result<Vec<u8>> {
    let file = bot.get_file(document.file.id.clone()).await?;
    let mut input = Vec::new();
    bot.download_file(&file.path, &mut input).await?;
    Ok(input)
}
