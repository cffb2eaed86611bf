//! Static connector configuration.

use std::path::PathBuf;

use serde::Deserialize;

use crate::errors::{KinesisError, Result};

/// Largest record count a single fetch call may request.
pub const MAX_BATCH_SIZE: i64 = 10_000;

/// Sentinel meaning "no cap on fetch calls per split".
pub const UNBOUNDED_MAX_BATCHES: i64 = -1;

/// Process-wide connector configuration, loaded once at construction
/// and immutable afterwards.
///
/// Owned by the metadata resolver; every other component reads it
/// through there. The checkpoint/batch fields seed the defaults the
/// connector advertises as session properties.
#[derive(Debug, Clone, Deserialize)]
pub struct KinesisConnectorConfig {
    /// Directory of JSON table descriptions.
    pub table_description_dir: PathBuf,

    /// Schema used for descriptions that do not name one.
    #[serde(default = "default_schema")]
    pub default_schema: String,

    /// Default checkpoint generation to resume from.
    #[serde(default)]
    pub iteration_number: i64,

    /// Default checkpoint lineage name. Distinct names checkpoint the
    /// same stream independently.
    #[serde(default = "default_logical_process_name")]
    pub logical_process_name: String,

    /// Default cap on fetch calls per split per query.
    /// [`UNBOUNDED_MAX_BATCHES`] disables the cap.
    #[serde(default = "default_max_batches")]
    pub max_batches: i64,

    /// Default record count requested per fetch call.
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,

    /// Whether reads consult and update the checkpoint store.
    #[serde(default)]
    pub checkpoint_enabled: bool,

    /// Whether the synthetic per-record columns are omitted from table
    /// schemas.
    #[serde(default = "default_true")]
    pub hide_internal_columns: bool,
}

fn default_schema() -> String {
    "default".to_string()
}

fn default_logical_process_name() -> String {
    "process1".to_string()
}

fn default_max_batches() -> i64 {
    UNBOUNDED_MAX_BATCHES
}

fn default_batch_size() -> i64 {
    10_000
}

fn default_true() -> bool {
    true
}

impl Default for KinesisConnectorConfig {
    fn default() -> Self {
        KinesisConnectorConfig {
            table_description_dir: PathBuf::new(),
            default_schema: default_schema(),
            iteration_number: 0,
            logical_process_name: default_logical_process_name(),
            max_batches: default_max_batches(),
            batch_size: default_batch_size(),
            checkpoint_enabled: false,
            hide_internal_columns: default_true(),
        }
    }
}

impl KinesisConnectorConfig {
    pub fn new(table_description_dir: impl Into<PathBuf>) -> Self {
        KinesisConnectorConfig {
            table_description_dir: table_description_dir.into(),
            ..Default::default()
        }
    }

    /// Validate field ranges. Called fail-fast before any collaborator
    /// is built.
    pub fn validate(&self) -> Result<()> {
        if self.table_description_dir.as_os_str().is_empty() {
            return Err(KinesisError::InvalidConfiguration(
                "table_description_dir must be set".to_string(),
            ));
        }
        if self.iteration_number < 0 {
            return Err(KinesisError::InvalidConfiguration(format!(
                "iteration_number must be >= 0, got {}",
                self.iteration_number
            )));
        }
        if self.logical_process_name.is_empty() {
            return Err(KinesisError::InvalidConfiguration(
                "logical_process_name must not be empty".to_string(),
            ));
        }
        if self.max_batches != UNBOUNDED_MAX_BATCHES && self.max_batches < 1 {
            return Err(KinesisError::InvalidConfiguration(format!(
                "max_batches must be >= 1 or {UNBOUNDED_MAX_BATCHES} (unbounded), got {}",
                self.max_batches
            )));
        }
        if self.batch_size < 1 || self.batch_size > MAX_BATCH_SIZE {
            return Err(KinesisError::InvalidConfiguration(format!(
                "batch_size must be in 1..={MAX_BATCH_SIZE}, got {}",
                self.batch_size
            )));
        }
        Ok(())
    }
}
