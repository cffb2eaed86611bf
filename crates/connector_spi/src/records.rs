//! Record retrieval.

use std::sync::Arc;

use async_trait::async_trait;
use datafusion::physical_plan::SendableRecordBatchStream;

use crate::errors::Result;
use crate::session::ConnectorSession;
use crate::splits::ConnectorSplit;

/// Produces a bounded, lazily-advancing record stream for one split.
///
/// Session-resolved limits (batch size, batch caps, checkpoint
/// identity) govern how far the stream advances; all per-split mutable
/// state lives inside the returned stream.
#[async_trait]
pub trait ConnectorRecordSetProvider: Send + Sync {
    /// Open a record stream for `split`, optionally projected to a
    /// subset of the table's columns by index.
    async fn record_stream(
        &self,
        split: Arc<dyn ConnectorSplit>,
        session: &ConnectorSession,
        projection: Option<&[usize]>,
    ) -> Result<SendableRecordBatchStream>;
}
