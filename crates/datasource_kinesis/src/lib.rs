//! Kinesis external table connector.
//!
//! Exposes an append-only partitioned stream to a SQL engine as a
//! queryable table. Table identity comes from JSON descriptions on
//! disk, read work is planned as one split per stream shard, and each
//! split is served as a bounded record stream whose checkpoint and
//! batch-cap behavior is driven by session properties.
//!
//! The wire protocol ([`client::KinesisClient`]), payload decoding
//! ([`decode::RecordDecoder`]), and durable checkpoint storage
//! ([`checkpoint::CheckpointStore`]) are seams filled in by the
//! embedding engine.

pub mod checkpoint;
pub mod client;
pub mod config;
pub mod connector;
pub mod decode;
pub mod errors;
pub mod metadata;
pub mod records;
pub mod session;
pub mod split;
pub mod table;
pub mod transaction;

#[cfg(test)]
pub(crate) mod test_util;

pub use checkpoint::{CheckpointStore, MemoryCheckpointStore, ShardCheckpointKey};
pub use client::{KinesisClient, RecordsPage, Shard, StartPosition, StreamRecord};
pub use config::KinesisConnectorConfig;
pub use connector::{KinesisConnector, KinesisConnectorFactory};
pub use decode::{RawMessageDecoder, RecordDecoder};
pub use errors::KinesisError;
pub use metadata::KinesisMetadata;
pub use records::KinesisRecordSetProvider;
pub use split::{KinesisSplit, KinesisSplitManager};
pub use table::{KinesisTableDescription, KinesisTableHandle};
pub use transaction::KinesisTransactionHandle;
