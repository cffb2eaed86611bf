//! Transaction handle.

use std::any::Any;

use connector_spi::transaction::ConnectorTransactionHandle;

/// Stateless marker for "this transaction reads at read-committed".
///
/// The connector carries no per-transaction state, so one shared
/// instance serves every transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KinesisTransactionHandle;

impl ConnectorTransactionHandle for KinesisTransactionHandle {
    fn as_any(&self) -> &dyn Any {
        self
    }
}
