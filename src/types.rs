//! Core types for manifest-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Process-local identifier of a batch run
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(pub u64);

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Processing stage of a single item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Fetching the manifest and re-encoding it into one file
    Transcode,
    /// Uploading the produced file to the recipient
    Deliver,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Transcode => f.write_str("transcode"),
            Stage::Deliver => f.write_str("deliver"),
        }
    }
}

/// Lifecycle state of one item
///
/// `Pending -> Transcoding -> {TranscodeFailed | Transcoded} -> {Delivered | DeliveryFailed}`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    /// Not started yet
    Pending,
    /// External tool is running
    Transcoding,
    /// File produced, upload not finished
    Transcoded,
    /// Uploaded to the recipient
    Delivered,
    /// The tool failed, timed out or could not be started
    TranscodeFailed,
    /// The file exists but could not be transmitted
    DeliveryFailed,
}

impl ItemState {
    /// Whether the item is finished
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ItemState::Delivered | ItemState::TranscodeFailed | ItemState::DeliveryFailed
        )
    }

    /// Whether `next` directly follows this state in the item lifecycle
    pub fn can_transition_to(&self, next: ItemState) -> bool {
        use ItemState::*;
        matches!(
            (self, next),
            (Pending, Transcoding)
                | (Transcoding, TranscodeFailed)
                | (Transcoding, Transcoded)
                | (Transcoded, Delivered)
                | (Transcoded, DeliveryFailed)
        )
    }
}

/// Terminal outcome of one item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOutcome {
    /// The video reached the recipient
    Delivered,
    /// The transcode step failed; carries the internal diagnostic
    TranscodeFailed(String),
    /// The upload failed; carries the transport's error text
    DeliveryFailed(String),
}

impl ItemOutcome {
    /// Whether the video was delivered
    pub fn is_delivered(&self) -> bool {
        matches!(self, ItemOutcome::Delivered)
    }

    /// The stage that failed, if any
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            ItemOutcome::Delivered => None,
            ItemOutcome::TranscodeFailed(_) => Some(Stage::Transcode),
            ItemOutcome::DeliveryFailed(_) => Some(Stage::Deliver),
        }
    }

    /// The failure reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            ItemOutcome::Delivered => None,
            ItemOutcome::TranscodeFailed(reason) | ItemOutcome::DeliveryFailed(reason) => {
                Some(reason)
            }
        }
    }
}

impl From<&ItemOutcome> for ItemState {
    fn from(outcome: &ItemOutcome) -> Self {
        match outcome {
            ItemOutcome::Delivered => ItemState::Delivered,
            ItemOutcome::TranscodeFailed(_) => ItemState::TranscodeFailed,
            ItemOutcome::DeliveryFailed(_) => ItemState::DeliveryFailed,
        }
    }
}

/// Recorded result of one URL
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    /// 1-based position in the batch
    pub index: usize,
    /// Manifest URL
    pub url: String,
    /// Terminal outcome
    pub outcome: ItemOutcome,
}

/// Summary of a finished batch
///
/// `results` holds exactly one entry per submitted URL, in submission order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchReport {
    /// Batch identifier
    pub id: BatchId,
    /// Per-item results in input order
    pub results: Vec<ItemResult>,
    /// Workspace the batch used (already removed when the report is returned)
    pub workspace: PathBuf,
    /// When the batch started
    pub started_at: DateTime<Utc>,
    /// When the last item finished
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    /// Number of items in the batch
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Number of delivered items
    pub fn delivered(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome.is_delivered())
            .count()
    }

    /// Number of failed items (either stage)
    pub fn failed(&self) -> usize {
        self.total() - self.delivered()
    }

    /// Whether every item was delivered
    pub fn is_complete_success(&self) -> bool {
        self.failed() == 0
    }

    /// Outcomes in input order
    pub fn outcomes(&self) -> Vec<&ItemOutcome> {
        self.results.iter().map(|r| &r.outcome).collect()
    }
}

/// Event emitted during a batch run
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Workspace acquired, items about to be processed
    BatchStarted {
        /// Batch ID
        id: BatchId,
        /// Number of URLs in the batch
        total: usize,
    },

    /// An item entered the transcode stage
    ItemStarted {
        /// Batch ID
        id: BatchId,
        /// 1-based item index
        index: usize,
        /// Manifest URL
        url: String,
    },

    /// The transcoder produced the item's file
    ItemTranscoded {
        /// Batch ID
        id: BatchId,
        /// 1-based item index
        index: usize,
    },

    /// The item's video was delivered
    ItemDelivered {
        /// Batch ID
        id: BatchId,
        /// 1-based item index
        index: usize,
    },

    /// The item failed; the batch continues
    ItemFailed {
        /// Batch ID
        id: BatchId,
        /// 1-based item index
        index: usize,
        /// Stage that failed
        stage: Stage,
        /// Error message
        error: String,
    },

    /// An item moved to the next lifecycle state
    ItemStateChanged {
        /// Batch ID
        id: BatchId,
        /// 1-based item index
        index: usize,
        /// Previous state
        from: ItemState,
        /// New state
        to: ItemState,
    },

    /// All items reached a terminal state
    BatchComplete {
        /// Batch ID
        id: BatchId,
        /// Number of delivered items
        delivered: usize,
        /// Number of failed items
        failed: usize,
    },
}
