//! Table and schema metadata resolution.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use datafusion::arrow::datatypes::SchemaRef;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaTableName {
    pub schema: String,
    pub table: String,
}

impl SchemaTableName {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        SchemaTableName {
            schema: schema.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for SchemaTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Opaque handle identifying a table to the connector that produced it.
pub trait ConnectorTableHandle: Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

/// Resolved metadata for a table: its name and arrow schema.
#[derive(Debug, Clone)]
pub struct ConnectorTableMetadata {
    pub name: SchemaTableName,
    pub schema: SchemaRef,
}

/// Resolves table/schema identity for a connector.
#[async_trait]
pub trait ConnectorMetadata: Send + Sync {
    /// Schema names this connector serves.
    async fn list_schema_names(&self) -> Result<Vec<String>>;

    /// Tables within `schema`, or all tables when `schema` is `None`.
    async fn list_tables(&self, schema: Option<&str>) -> Result<Vec<SchemaTableName>>;

    /// Resolve a name to a table handle, `Ok(None)` when absent.
    async fn table_handle(
        &self,
        name: &SchemaTableName,
    ) -> Result<Option<Arc<dyn ConnectorTableHandle>>>;

    /// Full metadata for a previously resolved handle.
    async fn table_metadata(
        &self,
        handle: &dyn ConnectorTableHandle,
    ) -> Result<ConnectorTableMetadata>;
}
