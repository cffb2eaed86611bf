//! The connector facade.

use std::sync::Arc;

use crate::errors::Result;
use crate::metadata::ConnectorMetadata;
use crate::records::ConnectorRecordSetProvider;
use crate::session::PropertyMetadata;
use crate::splits::ConnectorSplitManager;
use crate::transaction::{ConnectorTransactionHandle, IsolationLevel};

/// Single entry point the engine uses to drive a connector.
///
/// Implementations are constructed once, before query traffic, and are
/// immutable afterwards: every accessor returns the same instance on
/// every call, and the whole facade is safe for unsynchronized
/// concurrent use.
pub trait Connector: Send + Sync {
    /// Metadata resolver for the given transaction. The handle must
    /// have been produced by this connector's own `begin_transaction`.
    fn metadata(
        &self,
        transaction: &dyn ConnectorTransactionHandle,
    ) -> Arc<dyn ConnectorMetadata>;

    /// Negotiate a transaction. Fails when `isolation_level` is
    /// strictly stronger than the connector can honor; on success the
    /// returned handle is valid until the engine ends the transaction.
    fn begin_transaction(
        &self,
        isolation_level: IsolationLevel,
        read_only: bool,
    ) -> Result<Arc<dyn ConnectorTransactionHandle>>;

    fn split_manager(&self) -> Arc<dyn ConnectorSplitManager>;

    fn record_set_provider(&self) -> Arc<dyn ConnectorRecordSetProvider>;

    /// The session properties this connector supports, in declaration
    /// order.
    fn session_properties(&self) -> &[PropertyMetadata];
}
