//! Session property registry and accessors.
//!
//! Property names are a stable contract with the engine's
//! session-variable mechanism; renaming one breaks every query that
//! sets it explicitly.

use connector_spi::errors::{ConnectorError, Result};
use connector_spi::session::{ConnectorSession, PropertyMetadata};

use crate::config::{KinesisConnectorConfig, MAX_BATCH_SIZE, UNBOUNDED_MAX_BATCHES};

/// Checkpoint generation to resume from.
pub const ITERATION_NUMBER: &str = "ITERATION_NUMBER";
/// Name scoping the checkpoint lineage.
pub const CHECKPOINT_LOGICAL_NAME: &str = "CHECKPOINT_LOGICAL_NAME";
/// Cap on fetch calls to Kinesis per split per query.
pub const MAX_BATCHES: &str = "MAX_BATCHES";
/// Record limit per fetch call to Kinesis.
pub const BATCH_SIZE: &str = "BATCH_SIZE";

/// The session properties this connector advertises, in declaration
/// order, with defaults taken live from `config`.
///
/// Called exactly once, from the connector constructor.
pub fn build_property_list(config: &KinesisConnectorConfig) -> Vec<PropertyMetadata> {
    vec![
        PropertyMetadata::integer(
            ITERATION_NUMBER,
            "Checkpoint iteration number",
            config.iteration_number,
        ),
        PropertyMetadata::varchar(
            CHECKPOINT_LOGICAL_NAME,
            "Checkpoint logical name",
            config.logical_process_name.clone(),
        ),
        PropertyMetadata::integer(
            MAX_BATCHES,
            "Max number of calls to Kinesis per query",
            config.max_batches,
        ),
        PropertyMetadata::integer(
            BATCH_SIZE,
            "Record limit in calls to Kinesis",
            config.batch_size,
        ),
    ]
}

fn invalid(name: &str, value: impl ToString, reason: impl Into<String>) -> ConnectorError {
    ConnectorError::InvalidSessionPropertyValue {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Effective checkpoint iteration for this session.
pub fn iteration_number(
    session: &ConnectorSession,
    config: &KinesisConnectorConfig,
) -> Result<i64> {
    let value = session
        .integer_property(ITERATION_NUMBER)?
        .unwrap_or(config.iteration_number);
    if value < 0 {
        return Err(invalid(ITERATION_NUMBER, value, "must be >= 0"));
    }
    Ok(value)
}

/// Effective checkpoint lineage name for this session.
pub fn checkpoint_logical_name(
    session: &ConnectorSession,
    config: &KinesisConnectorConfig,
) -> Result<String> {
    let value = match session.varchar_property(CHECKPOINT_LOGICAL_NAME)? {
        Some(name) => name.to_string(),
        None => config.logical_process_name.clone(),
    };
    if value.is_empty() {
        return Err(invalid(CHECKPOINT_LOGICAL_NAME, "", "must not be empty"));
    }
    Ok(value)
}

/// Effective fetch-call cap for this session; `None` is unbounded.
pub fn max_batches(
    session: &ConnectorSession,
    config: &KinesisConnectorConfig,
) -> Result<Option<u64>> {
    let value = session
        .integer_property(MAX_BATCHES)?
        .unwrap_or(config.max_batches);
    match value {
        UNBOUNDED_MAX_BATCHES => Ok(None),
        v if v >= 1 => Ok(Some(v as u64)),
        v => Err(invalid(
            MAX_BATCHES,
            v,
            format!("must be >= 1 or {UNBOUNDED_MAX_BATCHES} (unbounded)"),
        )),
    }
}

/// Effective per-fetch record limit for this session.
pub fn batch_size(session: &ConnectorSession, config: &KinesisConnectorConfig) -> Result<usize> {
    let value = session
        .integer_property(BATCH_SIZE)?
        .unwrap_or(config.batch_size);
    if value < 1 || value > MAX_BATCH_SIZE {
        return Err(invalid(
            BATCH_SIZE,
            value,
            format!("must be in 1..={MAX_BATCH_SIZE}"),
        ));
    }
    Ok(value as usize)
}
