//! Stream access seam.
//!
//! The wire protocol for talking to Kinesis lives behind
//! [`KinesisClient`]; the connector only depends on this trait. Tests
//! drive it with an in-memory implementation.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// A partition of the stream providing an ordered record sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    pub shard_id: String,
}

impl Shard {
    pub fn new(shard_id: impl Into<String>) -> Self {
        Shard {
            shard_id: shard_id.into(),
        }
    }
}

/// Where in a shard a read begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPosition {
    /// Oldest retained record.
    TrimHorizon,
    /// Immediately after the given sequence number.
    AfterSequenceNumber(String),
    /// Only records appended from now on.
    Latest,
}

/// A single record as fetched from the stream.
#[derive(Debug, Clone)]
pub struct StreamRecord {
    pub sequence_number: String,
    pub partition_key: String,
    pub arrival: DateTime<Utc>,
    pub data: Bytes,
}

/// One page returned by a fetch call.
///
/// `next_iterator` is `None` once the shard is closed and drained.
/// `millis_behind_latest` of zero means the read has caught up with the
/// stream tip.
#[derive(Debug, Clone, Default)]
pub struct RecordsPage {
    pub records: Vec<StreamRecord>,
    pub next_iterator: Option<String>,
    pub millis_behind_latest: Option<i64>,
}

/// Client for shard discovery and record fetching.
#[async_trait]
pub trait KinesisClient: Send + Sync {
    /// Shards of `stream_name`, in no particular order.
    async fn list_shards(&self, stream_name: &str) -> Result<Vec<Shard>>;

    /// Obtain an iterator token positioned at `position`.
    async fn shard_iterator(
        &self,
        stream_name: &str,
        shard_id: &str,
        position: &StartPosition,
    ) -> Result<String>;

    /// Fetch at most `limit` records at `iterator`.
    async fn get_records(&self, iterator: &str, limit: usize) -> Result<RecordsPage>;
}
