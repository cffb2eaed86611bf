//! Shard read checkpoints.
//!
//! A checkpoint records the last sequence number a logical consumer
//! read from one shard, keyed by (logical process name, iteration
//! number, stream, shard). Distinct logical names checkpoint the same
//! stream independently. Durable stores are supplied by the embedder;
//! the in-memory store here covers a single process lifetime.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Identity of a resumable read position within one shard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShardCheckpointKey {
    pub logical_process_name: String,
    pub iteration_number: i64,
    pub stream_name: String,
    pub shard_id: String,
}

/// Storage for shard checkpoints.
pub trait CheckpointStore: Send + Sync {
    /// Last saved sequence number for `key`, if any.
    fn load(&self, key: &ShardCheckpointKey) -> Option<String>;

    /// Record `sequence_number` as the last read position for `key`.
    fn save(&self, key: ShardCheckpointKey, sequence_number: String);
}

#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    inner: RwLock<HashMap<ShardCheckpointKey, String>>,
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self, key: &ShardCheckpointKey) -> Option<String> {
        self.inner.read().get(key).cloned()
    }

    fn save(&self, key: ShardCheckpointKey, sequence_number: String) {
        self.inner.write().insert(key, sequence_number);
    }
}
