//! Shared test doubles: a scripted in-memory stream client and
//! table-description fixtures.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;

use crate::client::{KinesisClient, RecordsPage, Shard, StartPosition, StreamRecord};
use crate::config::KinesisConnectorConfig;
use crate::errors::{KinesisError, Result};
use crate::metadata::KinesisMetadata;

pub(crate) fn test_record(sequence_number: &str, data: &str) -> StreamRecord {
    StreamRecord {
        sequence_number: sequence_number.to_string(),
        partition_key: format!("pk-{sequence_number}"),
        arrival: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        data: Bytes::copy_from_slice(data.as_bytes()),
    }
}

#[derive(Debug, Default)]
struct ShardData {
    records: Vec<StreamRecord>,
    closed: bool,
}

/// In-memory [`KinesisClient`] with scripted shards and records.
///
/// Iterator tokens encode `stream|shard|index`; every `get_records`
/// call is recorded so tests can assert on fetch counts and limits.
#[derive(Debug, Default)]
pub(crate) struct MockKinesisClient {
    shards: Mutex<HashMap<(String, String), ShardData>>,
    get_records_limits: Mutex<Vec<usize>>,
}

impl MockKinesisClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an open shard (reads reach the tip and report caught-up).
    pub fn with_shard(self, stream: &str, shard: &str) -> Self {
        self.shards
            .lock()
            .insert((stream.to_string(), shard.to_string()), ShardData::default());
        self
    }

    /// Add a closed shard (the iterator ends once drained).
    pub fn with_closed_shard(self, stream: &str, shard: &str) -> Self {
        self.shards.lock().insert(
            (stream.to_string(), shard.to_string()),
            ShardData {
                records: Vec::new(),
                closed: true,
            },
        );
        self
    }

    pub fn with_records(self, stream: &str, shard: &str, records: Vec<StreamRecord>) -> Self {
        self.add_records(stream, shard, records);
        self
    }

    /// Append records to an existing shard.
    pub fn add_records(&self, stream: &str, shard: &str, records: Vec<StreamRecord>) {
        let mut shards = self.shards.lock();
        let data = shards
            .entry((stream.to_string(), shard.to_string()))
            .or_default();
        data.records.extend(records);
    }

    /// Limits passed to every `get_records` call so far.
    pub fn get_records_limits(&self) -> Vec<usize> {
        self.get_records_limits.lock().clone()
    }
}

fn token(stream: &str, shard: &str, index: usize) -> String {
    format!("{stream}|{shard}|{index}")
}

fn parse_token(iterator: &str) -> Result<(String, String, usize)> {
    let mut parts = iterator.splitn(3, '|');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(stream), Some(shard), Some(index)) => Ok((
            stream.to_string(),
            shard.to_string(),
            index
                .parse()
                .map_err(|_| KinesisError::Client(format!("bad iterator: {iterator}")))?,
        )),
        _ => Err(KinesisError::Client(format!("bad iterator: {iterator}"))),
    }
}

#[async_trait]
impl KinesisClient for MockKinesisClient {
    async fn list_shards(&self, stream_name: &str) -> Result<Vec<Shard>> {
        Ok(self
            .shards
            .lock()
            .keys()
            .filter(|(stream, _)| stream == stream_name)
            .map(|(_, shard)| Shard::new(shard.clone()))
            .collect())
    }

    async fn shard_iterator(
        &self,
        stream_name: &str,
        shard_id: &str,
        position: &StartPosition,
    ) -> Result<String> {
        let shards = self.shards.lock();
        let data = shards
            .get(&(stream_name.to_string(), shard_id.to_string()))
            .ok_or_else(|| KinesisError::Client(format!("unknown shard: {shard_id}")))?;

        let index = match position {
            StartPosition::TrimHorizon => 0,
            StartPosition::Latest => data.records.len(),
            StartPosition::AfterSequenceNumber(seq) => {
                data.records
                    .iter()
                    .position(|r| &r.sequence_number == seq)
                    .map(|i| i + 1)
                    .ok_or_else(|| KinesisError::Client(format!("unknown sequence: {seq}")))?
            }
        };
        Ok(token(stream_name, shard_id, index))
    }

    async fn get_records(&self, iterator: &str, limit: usize) -> Result<RecordsPage> {
        self.get_records_limits.lock().push(limit);

        let (stream, shard, index) = parse_token(iterator)?;
        let shards = self.shards.lock();
        let data = shards
            .get(&(stream.clone(), shard.clone()))
            .ok_or_else(|| KinesisError::Client(format!("unknown shard: {shard}")))?;

        let end = data.records.len().min(index + limit);
        let records = data.records[index.min(data.records.len())..end].to_vec();
        let drained = end >= data.records.len();

        Ok(RecordsPage {
            records,
            next_iterator: if data.closed && drained {
                None
            } else {
                Some(token(&stream, &shard, end))
            },
            millis_behind_latest: Some(if drained { 0 } else { 1_000 }),
        })
    }
}

/// Table fixture written to a temporary description directory.
pub(crate) struct TestTable {
    pub table_name: &'static str,
    pub stream_name: &'static str,
    pub columns: Vec<(&'static str, &'static str)>,
}

impl TestTable {
    /// A table with no declared columns (raw message access only).
    pub fn raw(table_name: &'static str, stream_name: &'static str) -> Self {
        TestTable {
            table_name,
            stream_name,
            columns: Vec::new(),
        }
    }

    pub fn with_columns(
        table_name: &'static str,
        stream_name: &'static str,
        columns: Vec<(&'static str, &'static str)>,
    ) -> Self {
        TestTable {
            table_name,
            stream_name,
            columns,
        }
    }
}

pub(crate) fn test_metadata_with_tables(tables: &[TestTable]) -> KinesisMetadata {
    test_metadata(tables, |_| {})
}

/// Build a metadata resolver over a temporary description directory,
/// with `tweak` applied to the config before loading.
pub(crate) fn test_metadata(
    tables: &[TestTable],
    tweak: impl FnOnce(&mut KinesisConnectorConfig),
) -> KinesisMetadata {
    let dir = tempfile::tempdir().unwrap();
    for table in tables {
        let columns: Vec<_> = table
            .columns
            .iter()
            .map(|(name, type_name)| serde_json::json!({"name": name, "type": type_name}))
            .collect();
        let desc = serde_json::json!({
            "table_name": table.table_name,
            "stream_name": table.stream_name,
            "columns": columns,
        });
        std::fs::write(
            dir.path().join(format!("{}.json", table.table_name)),
            serde_json::to_vec_pretty(&desc).unwrap(),
        )
        .unwrap();
    }

    let mut config = KinesisConnectorConfig::new(dir.path());
    tweak(&mut config);
    KinesisMetadata::load(config).unwrap()
}
