//! Batch pipeline controller
//!
//! Turns an ordered list of manifest URLs into a strictly sequential series of
//! items. Each item runs:
//! 1. Announce - post a progress message
//! 2. Transcode - external tool writes `video_{index}.mp4` into the workspace
//! 3. Deliver - upload the file with a "Video i of n" caption
//! 4. Retract - delete the progress message, discard the file
//!
//! A failing transcode or upload is recorded for that item and the loop moves
//! on. Only transport and workspace failures abort the batch; the workspace is
//! removed on every exit path.

mod workspace;

pub use workspace::Workspace;

use crate::config::Config;
use crate::delivery::{DeliveryChannel, ProgressReporter};
use crate::error::{DeliveryError, Error, Result, TranscodeError};
use crate::messages;
use crate::transcode::{Transcoder, select_transcoder};
use crate::types::{BatchId, BatchReport, Event, ItemOutcome, ItemResult, ItemState, Stage};
use crate::urls;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Sequential download-transcode-deliver controller
///
/// One `BatchPipeline` can run many batches, one after another or (with
/// disjoint workspaces) side by side; items within a batch never overlap.
///
/// # Examples
///
/// ```no_run
/// use manifest_dl::{BatchPipeline, Config};
/// use manifest_dl::delivery::DeliveryChannel;
///
/// # async fn example(channel: &dyn DeliveryChannel) -> manifest_dl::Result<()> {
/// let pipeline = BatchPipeline::from_config(Config::default());
/// let urls = vec!["https://cdn.example.com/live/index.m3u8".to_string()];
/// let report = pipeline.run(&urls, channel).await?;
/// println!("{} of {} delivered", report.delivered(), report.total());
/// # Ok(())
/// # }
/// ```
pub struct BatchPipeline {
    config: Arc<Config>,
    transcoder: Arc<dyn Transcoder>,
    event_tx: broadcast::Sender<Event>,
    next_batch_id: AtomicU64,
}

impl BatchPipeline {
    /// Create a pipeline with an explicit transcoder
    pub fn new(config: Arc<Config>, transcoder: Arc<dyn Transcoder>) -> Self {
        let (event_tx, _rx) = broadcast::channel(1000);
        Self {
            config,
            transcoder,
            event_tx,
            next_batch_id: AtomicU64::new(1),
        }
    }

    /// Create a pipeline whose transcoder is chosen from the configuration
    pub fn from_config(config: impl Into<Arc<Config>>) -> Self {
        let config = config.into();
        let transcoder = select_transcoder(&config.transcode);
        Self::new(config, transcoder)
    }

    /// Subscribe to batch events
    ///
    /// Each subscriber receives all events independently. A subscriber that
    /// falls more than 1000 events behind gets `RecvError::Lagged`.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Name of the transcoder in use
    pub fn transcoder_name(&self) -> &'static str {
        self.transcoder.name()
    }

    /// Parse a submitted URL list and run it
    ///
    /// When no line is a manifest URL, the recipient is told so and
    /// [`Error::NoValidUrls`] is returned without creating a workspace.
    pub async fn submit(&self, input: &[u8], channel: &dyn DeliveryChannel) -> Result<BatchReport> {
        let urls = urls::parse_url_bytes(input);
        if urls.is_empty() {
            info!("submitted list contains no manifest URLs");
            channel.send_text(messages::NO_VALID_URLS).await?;
            return Err(Error::NoValidUrls);
        }
        self.run(&urls, channel).await
    }

    /// Process every URL in order and report one outcome per URL
    ///
    /// # Errors
    ///
    /// - [`Error::NoValidUrls`] if `urls` is empty (nothing is created or sent)
    /// - [`Error::Io`] if the workspace cannot be created
    /// - transport errors from texts or progress messages
    ///
    /// Per-item transcode and delivery failures are not errors; they are
    /// recorded in the returned [`BatchReport`].
    pub async fn run(&self, urls: &[String], channel: &dyn DeliveryChannel) -> Result<BatchReport> {
        if urls.is_empty() {
            return Err(Error::NoValidUrls);
        }

        let id = BatchId(self.next_batch_id.fetch_add(1, Ordering::Relaxed));
        let started_at = Utc::now();
        let total = urls.len();

        // Dropped on every early return below, which removes the directory.
        let workspace = Workspace::create(&self.config.workspace)?;
        let workspace_path = workspace.path().to_path_buf();
        info!(batch_id = %id, total, workspace = ?workspace_path, "batch started");

        channel.send_text(&messages::batch_started(total)).await?;
        self.event_tx.send(Event::BatchStarted { id, total }).ok();

        let progress = ProgressReporter::new(channel);
        let mut results = Vec::with_capacity(total);
        for (offset, url) in urls.iter().enumerate() {
            let index = offset + 1;
            let outcome = self
                .process_item(id, index, total, url, &workspace, channel, &progress)
                .await?;
            results.push(ItemResult {
                index,
                url: url.clone(),
                outcome,
            });
        }

        channel.send_text(messages::BATCH_COMPLETE).await?;

        let report = BatchReport {
            id,
            results,
            workspace: workspace_path,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            batch_id = %id,
            delivered = report.delivered(),
            failed = report.failed(),
            "batch complete"
        );
        self.event_tx
            .send(Event::BatchComplete {
                id,
                delivered: report.delivered(),
                failed: report.failed(),
            })
            .ok();

        workspace.close();
        Ok(report)
    }

    /// Drive one item to a terminal outcome
    ///
    /// The progress message is retracted and the item file discarded whether
    /// the item succeeded, failed, or hit a fatal transport error.
    #[allow(clippy::too_many_arguments)]
    async fn process_item(
        &self,
        id: BatchId,
        index: usize,
        total: usize,
        url: &str,
        workspace: &Workspace,
        channel: &dyn DeliveryChannel,
        progress: &ProgressReporter<'_>,
    ) -> Result<ItemOutcome> {
        let handle = progress
            .announce(&messages::progress(index, total, url))
            .await?;
        let output = workspace.item_path(index);

        let outcome = self
            .transcode_and_deliver(id, index, total, url, &output, channel)
            .await;

        progress.retract(handle).await;
        workspace.discard(&output).await;
        outcome
    }

    async fn transcode_and_deliver(
        &self,
        id: BatchId,
        index: usize,
        total: usize,
        url: &str,
        output: &Path,
        channel: &dyn DeliveryChannel,
    ) -> Result<ItemOutcome> {
        if let Err(e) = channel.indicate_upload().await {
            debug!(batch_id = %id, index, error = %e, "activity indicator failed");
        }

        let mut state = ItemState::Pending;
        self.advance(id, index, &mut state, ItemState::Transcoding);
        debug!(batch_id = %id, index, url, ?output, "transcoding");
        self.event_tx
            .send(Event::ItemStarted {
                id,
                index,
                url: url.to_string(),
            })
            .ok();

        if let Err(e) = self.transcode(url, output).await {
            warn!(batch_id = %id, index, url, error = %e, "transcode failed");
            self.advance(id, index, &mut state, ItemState::TranscodeFailed);
            channel.send_text(&messages::transcode_failed(url)).await?;
            self.emit_failure(id, index, Stage::Transcode, &e.to_string());
            return Ok(ItemOutcome::TranscodeFailed(e.to_string()));
        }
        self.advance(id, index, &mut state, ItemState::Transcoded);
        self.event_tx.send(Event::ItemTranscoded { id, index }).ok();

        debug!(batch_id = %id, index, "delivering");
        match self.deliver(channel, output, &messages::caption(index, total)).await {
            Ok(()) => {
                info!(batch_id = %id, index, url, "item delivered");
                self.advance(id, index, &mut state, ItemState::Delivered);
                self.event_tx.send(Event::ItemDelivered { id, index }).ok();
                Ok(ItemOutcome::Delivered)
            }
            Err(e) => {
                warn!(batch_id = %id, index, url, error = %e, "delivery failed");
                self.advance(id, index, &mut state, ItemState::DeliveryFailed);
                channel
                    .send_text(&messages::delivery_failed(index, &e.to_string()))
                    .await?;
                self.emit_failure(id, index, Stage::Deliver, &e.to_string());
                Ok(ItemOutcome::DeliveryFailed(e.to_string()))
            }
        }
    }

    async fn transcode(&self, url: &str, output: &Path) -> std::result::Result<(), TranscodeError> {
        let run = self.transcoder.transcode(url, output);
        match self.config.transcode.timeout {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| TranscodeError::TimedOut(limit))?,
            None => run.await,
        }
    }

    async fn deliver(
        &self,
        channel: &dyn DeliveryChannel,
        output: &Path,
        caption: &str,
    ) -> std::result::Result<(), DeliveryError> {
        let send = channel.send_video(output, caption);
        match self.config.delivery.timeout {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .map_err(|_| DeliveryError::TimedOut(limit))?,
            None => send.await,
        }
    }

    /// Move an item to its next lifecycle state and publish the change
    fn advance(&self, id: BatchId, index: usize, state: &mut ItemState, next: ItemState) {
        if !state.can_transition_to(next) {
            warn!(batch_id = %id, index, from = ?*state, to = ?next, "unexpected item state change");
        }
        debug!(batch_id = %id, index, from = ?*state, to = ?next, "item state changed");
        self.event_tx
            .send(Event::ItemStateChanged {
                id,
                index,
                from: *state,
                to: next,
            })
            .ok();
        *state = next;
    }

    fn emit_failure(&self, id: BatchId, index: usize, stage: Stage, error: &str) {
        self.event_tx
            .send(Event::ItemFailed {
                id,
                index,
                stage,
                error: error.to_string(),
            })
            .ok();
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
