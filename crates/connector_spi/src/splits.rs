//! Split planning.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::Result;
use crate::metadata::ConnectorTableHandle;
use crate::session::ConnectorSession;
use crate::transaction::ConnectorTransactionHandle;

/// A unit of read work assignable to one worker.
pub trait ConnectorSplit: Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

/// Produces the ordered set of splits for a table within the active
/// transaction. For partitioned streams this is one split per shard (or
/// a range within one).
#[async_trait]
pub trait ConnectorSplitManager: Send + Sync {
    async fn splits(
        &self,
        transaction: &dyn ConnectorTransactionHandle,
        table: &dyn ConnectorTableHandle,
        session: &ConnectorSession,
    ) -> Result<Vec<Arc<dyn ConnectorSplit>>>;
}
