//! Connector SPI.
//!
//! The surface a connector implements and the engine consumes: a
//! [`Connector`] facade handing out metadata, split planning, and record
//! retrieval, plus the transaction and session-property protocol that
//! scopes every query.

pub mod connector;
pub mod errors;
pub mod metadata;
pub mod records;
pub mod session;
pub mod splits;
pub mod transaction;

pub use connector::Connector;
pub use errors::{ConnectorError, Result};
pub use metadata::{ConnectorMetadata, ConnectorTableHandle, ConnectorTableMetadata, SchemaTableName};
pub use records::ConnectorRecordSetProvider;
pub use session::{ConnectorSession, PropertyMetadata, PropertyValue};
pub use splits::{ConnectorSplit, ConnectorSplitManager};
pub use transaction::{check_connector_supports, ConnectorTransactionHandle, IsolationLevel};
