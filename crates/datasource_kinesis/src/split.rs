//! Split planning: one split per stream shard.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use connector_spi::errors::Result as SpiResult;
use connector_spi::metadata::{ConnectorTableHandle, SchemaTableName};
use connector_spi::session::ConnectorSession;
use connector_spi::splits::{ConnectorSplit, ConnectorSplitManager};
use connector_spi::transaction::ConnectorTransactionHandle;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{KinesisClient, StartPosition};
use crate::errors::KinesisError;
use crate::metadata::KinesisMetadata;
use crate::table::{KinesisColumnDescription, KinesisTableHandle};

/// Read work for one shard. Self-contained so the engine can ship it to
/// a worker: it carries the declared columns alongside the shard
/// coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KinesisSplit {
    pub stream_name: String,
    pub shard_id: String,
    pub start: StartPosition,
    pub columns: Vec<KinesisColumnDescription>,
}

impl ConnectorSplit for KinesisSplit {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Plans the ordered set of splits for a table by listing the stream's
/// shards.
pub struct KinesisSplitManager {
    client: Arc<dyn KinesisClient>,
    metadata: Arc<KinesisMetadata>,
}

impl KinesisSplitManager {
    pub fn new(client: Arc<dyn KinesisClient>, metadata: Arc<KinesisMetadata>) -> Self {
        KinesisSplitManager { client, metadata }
    }
}

#[async_trait]
impl ConnectorSplitManager for KinesisSplitManager {
    async fn splits(
        &self,
        _transaction: &dyn ConnectorTransactionHandle,
        table: &dyn ConnectorTableHandle,
        _session: &ConnectorSession,
    ) -> SpiResult<Vec<Arc<dyn ConnectorSplit>>> {
        let handle = table
            .as_any()
            .downcast_ref::<KinesisTableHandle>()
            .ok_or(KinesisError::ForeignHandle("table handle"))?;

        let name = SchemaTableName::new(handle.schema_name.clone(), handle.table_name.clone());
        let columns = self
            .metadata
            .description(&name)
            .ok_or_else(|| KinesisError::TableNotFound(name.to_string()))?
            .columns
            .clone();

        let mut shards = self.client.list_shards(&handle.stream_name).await?;
        shards.sort_by(|a, b| a.shard_id.cmp(&b.shard_id));
        debug!(
            stream = %handle.stream_name,
            shards = shards.len(),
            "planned one split per shard"
        );

        Ok(shards
            .into_iter()
            .map(|shard| {
                Arc::new(KinesisSplit {
                    stream_name: handle.stream_name.clone(),
                    shard_id: shard.shard_id,
                    start: StartPosition::TrimHorizon,
                    columns: columns.clone(),
                }) as Arc<dyn ConnectorSplit>
            })
            .collect())
    }
}
