//! The Kinesis connector facade and its factory.

use std::sync::Arc;

use connector_spi::connector::Connector;
use connector_spi::errors::Result as SpiResult;
use connector_spi::metadata::ConnectorMetadata;
use connector_spi::records::ConnectorRecordSetProvider;
use connector_spi::session::PropertyMetadata;
use connector_spi::splits::ConnectorSplitManager;
use connector_spi::transaction::{
    check_connector_supports, ConnectorTransactionHandle, IsolationLevel,
};
use tracing::info;

use crate::checkpoint::{CheckpointStore, MemoryCheckpointStore};
use crate::client::KinesisClient;
use crate::config::KinesisConnectorConfig;
use crate::decode::{RawMessageDecoder, RecordDecoder};
use crate::errors::Result;
use crate::metadata::KinesisMetadata;
use crate::records::KinesisRecordSetProvider;
use crate::session::build_property_list;
use crate::split::KinesisSplitManager;
use crate::transaction::KinesisTransactionHandle;

/// Composition root binding metadata resolution, split planning, and
/// record retrieval behind the engine's transaction and
/// session-property protocol.
///
/// Immutable after construction: every accessor hands back the
/// construction-time instance, so concurrent engine workers need no
/// synchronization here. The only consistency guarantee made to the
/// engine is read-committed: records become visible as soon as they
/// are fetched from the stream, with no snapshot across splits or
/// calls.
pub struct KinesisConnector {
    metadata: Arc<KinesisMetadata>,
    split_manager: Arc<KinesisSplitManager>,
    record_set_provider: Arc<KinesisRecordSetProvider>,
    property_list: Vec<PropertyMetadata>,
    transaction_handle: Arc<KinesisTransactionHandle>,
}

impl KinesisConnector {
    /// Wire the connector from its collaborators. The session property
    /// list is built here, once, with defaults taken live from the
    /// metadata resolver's configuration; nothing can rebuild it later.
    pub fn new(
        metadata: Arc<KinesisMetadata>,
        split_manager: Arc<KinesisSplitManager>,
        record_set_provider: Arc<KinesisRecordSetProvider>,
    ) -> Self {
        let property_list = build_property_list(metadata.connector_config());
        KinesisConnector {
            metadata,
            split_manager,
            record_set_provider,
            property_list,
            transaction_handle: Arc::new(KinesisTransactionHandle),
        }
    }
}

impl Connector for KinesisConnector {
    fn metadata(
        &self,
        _transaction: &dyn ConnectorTransactionHandle,
    ) -> Arc<dyn ConnectorMetadata> {
        self.metadata.clone()
    }

    fn begin_transaction(
        &self,
        isolation_level: IsolationLevel,
        _read_only: bool,
    ) -> SpiResult<Arc<dyn ConnectorTransactionHandle>> {
        check_connector_supports(IsolationLevel::ReadCommitted, isolation_level)?;
        Ok(self.transaction_handle.clone())
    }

    fn split_manager(&self) -> Arc<dyn ConnectorSplitManager> {
        self.split_manager.clone()
    }

    fn record_set_provider(&self) -> Arc<dyn ConnectorRecordSetProvider> {
        self.record_set_provider.clone()
    }

    fn session_properties(&self) -> &[PropertyMetadata] {
        &self.property_list
    }
}

/// Builds a [`KinesisConnector`] from configuration.
///
/// Validation is fail-fast: a bad config is rejected before any
/// collaborator is constructed, so a partially-wired connector is never
/// observable.
pub struct KinesisConnectorFactory {
    config: KinesisConnectorConfig,
    checkpoint_store: Option<Arc<dyn CheckpointStore>>,
    decoder: Option<Arc<dyn RecordDecoder>>,
}

impl KinesisConnectorFactory {
    pub fn new(config: KinesisConnectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(KinesisConnectorFactory {
            config,
            checkpoint_store: None,
            decoder: None,
        })
    }

    /// Use a durable checkpoint store instead of the in-memory default.
    pub fn with_checkpoint_store(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoint_store = Some(store);
        self
    }

    /// Use a format-aware record decoder instead of the raw default.
    pub fn with_decoder(mut self, decoder: Arc<dyn RecordDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn create(self, client: Arc<dyn KinesisClient>) -> Result<KinesisConnector> {
        let metadata = Arc::new(KinesisMetadata::load(self.config)?);
        let split_manager = Arc::new(KinesisSplitManager::new(client.clone(), metadata.clone()));
        let checkpoints = self
            .checkpoint_store
            .unwrap_or_else(|| Arc::new(MemoryCheckpointStore::default()));
        let decoder = self
            .decoder
            .unwrap_or_else(|| Arc::new(RawMessageDecoder));
        let record_set_provider = Arc::new(KinesisRecordSetProvider::new(
            client,
            metadata.clone(),
            checkpoints,
            decoder,
        ));

        let connector = KinesisConnector::new(metadata, split_manager, record_set_provider);
        info!(
            properties = connector.property_list.len(),
            "created Kinesis connector"
        );
        Ok(connector)
    }
}

#[cfg(test)]
mod tests {
    use connector_spi::errors::ConnectorError;
    use connector_spi::session::PropertyValue;

    use super::*;
    use crate::errors::KinesisError;
    use crate::session::{BATCH_SIZE, CHECKPOINT_LOGICAL_NAME, ITERATION_NUMBER, MAX_BATCHES};
    use crate::test_util::{test_metadata, MockKinesisClient, TestTable};

    fn test_connector() -> KinesisConnector {
        let client: Arc<dyn KinesisClient> = Arc::new(MockKinesisClient::new());
        let metadata = Arc::new(test_metadata(
            &[TestTable::raw("raw", "events")],
            |cfg| {
                cfg.iteration_number = 0;
                cfg.logical_process_name = "proc-a".to_string();
                cfg.max_batches = 100;
                cfg.batch_size = 1000;
            },
        ));
        let split_manager = Arc::new(KinesisSplitManager::new(client.clone(), metadata.clone()));
        let record_set_provider = Arc::new(KinesisRecordSetProvider::new(
            client,
            metadata.clone(),
            Arc::new(MemoryCheckpointStore::default()),
            Arc::new(RawMessageDecoder),
        ));
        KinesisConnector::new(metadata, split_manager, record_set_provider)
    }

    #[test]
    fn advertised_properties_come_from_config() {
        let connector = test_connector();
        let properties = connector.session_properties();

        let names: Vec<_> = properties.iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            vec![ITERATION_NUMBER, CHECKPOINT_LOGICAL_NAME, MAX_BATCHES, BATCH_SIZE]
        );
        assert_eq!(properties[0].default(), &PropertyValue::Integer(0));
        assert_eq!(
            properties[1].default(),
            &PropertyValue::Varchar("proc-a".to_string())
        );
        assert_eq!(properties[2].default(), &PropertyValue::Integer(100));
        assert_eq!(properties[3].default(), &PropertyValue::Integer(1000));
    }

    #[test]
    fn read_committed_transactions_share_one_handle() {
        let connector = test_connector();
        let first = connector
            .begin_transaction(IsolationLevel::ReadCommitted, false)
            .unwrap();
        let second = connector
            .begin_transaction(IsolationLevel::ReadCommitted, true)
            .unwrap();
        let third = connector
            .begin_transaction(IsolationLevel::ReadUncommitted, false)
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn stronger_isolation_rejected_without_side_effects() {
        let connector = test_connector();
        let before: Vec<_> = connector
            .session_properties()
            .iter()
            .map(|p| p.default().clone())
            .collect();

        for level in [IsolationLevel::RepeatableRead, IsolationLevel::Serializable] {
            let err = connector.begin_transaction(level, false).unwrap_err();
            assert!(matches!(
                err,
                ConnectorError::UnsupportedIsolationLevel { .. }
            ));
        }

        let after: Vec<_> = connector
            .session_properties()
            .iter()
            .map(|p| p.default().clone())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn metadata_is_reference_stable() {
        let connector = test_connector();
        let handle = connector
            .begin_transaction(IsolationLevel::ReadCommitted, false)
            .unwrap();

        let first = connector.metadata(handle.as_ref());
        let second = connector.metadata(handle.as_ref());
        assert!(Arc::ptr_eq(&first, &second));

        assert!(Arc::ptr_eq(
            &connector.split_manager(),
            &connector.split_manager()
        ));
        assert!(Arc::ptr_eq(
            &connector.record_set_provider(),
            &connector.record_set_provider()
        ));
    }

    #[tokio::test]
    async fn full_read_through_the_facade() {
        use connector_spi::metadata::SchemaTableName;
        use datafusion::arrow::record_batch::RecordBatch;
        use futures::TryStreamExt;

        use crate::test_util::test_record;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("raw.json"),
            r#"{"table_name": "raw", "stream_name": "events"}"#,
        )
        .unwrap();
        let mut config = KinesisConnectorConfig::new(dir.path());
        config.hide_internal_columns = false;

        let client = Arc::new(
            MockKinesisClient::new()
                .with_closed_shard("events", "shard-000")
                .with_records(
                    "events",
                    "shard-000",
                    vec![test_record("1", "a"), test_record("2", "b")],
                ),
        );
        let connector = KinesisConnectorFactory::new(config)
            .unwrap()
            .create(client)
            .unwrap();

        let session = connector_spi::session::ConnectorSession::new("q1");
        let transaction = connector
            .begin_transaction(IsolationLevel::ReadCommitted, false)
            .unwrap();

        let metadata = connector.metadata(transaction.as_ref());
        let name = SchemaTableName::new("default", "raw");
        assert_eq!(metadata.list_tables(None).await.unwrap(), vec![name.clone()]);
        let table = metadata.table_handle(&name).await.unwrap().unwrap();

        let splits = connector
            .split_manager()
            .splits(transaction.as_ref(), table.as_ref(), &session)
            .await
            .unwrap();
        assert_eq!(splits.len(), 1);

        let stream = connector
            .record_set_provider()
            .record_stream(splits[0].clone(), &session, None)
            .await
            .unwrap();
        let batches: Vec<RecordBatch> = stream.try_collect().await.unwrap();
        assert_eq!(batches.iter().map(|b| b.num_rows()).sum::<usize>(), 2);
    }

    #[test]
    fn factory_rejects_invalid_config() {
        let mut config = KinesisConnectorConfig::new("/etc/kinesis");
        config.batch_size = 0;
        assert!(matches!(
            KinesisConnectorFactory::new(config),
            Err(KinesisError::InvalidConfiguration(_))
        ));

        // A config that validates but points at a missing directory
        // still fails before a connector exists.
        let config = KinesisConnectorConfig::new("/nonexistent/kinesis-tables");
        let factory = KinesisConnectorFactory::new(config).unwrap();
        assert!(matches!(
            factory.create(Arc::new(MockKinesisClient::new())),
            Err(KinesisError::InvalidConfiguration(_))
        ));
    }
}
