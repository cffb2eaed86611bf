//! Table descriptions, handles, and schema assembly.

use std::any::Any;
use std::sync::Arc;

use connector_spi::metadata::ConnectorTableHandle;
use datafusion::arrow::datatypes::{DataType, Field, Fields, Schema, SchemaRef, TimeUnit};
use serde::{Deserialize, Serialize};

use crate::errors::{KinesisError, Result};

/// Shard the record came from.
pub const SHARD_ID_FIELD: &str = "_shard_id";
/// Sequence number of the record within its shard.
pub const SEQUENCE_NUMBER_FIELD: &str = "_sequence_number";
/// Partition key the producer wrote the record with.
pub const PARTITION_KEY_FIELD: &str = "_partition_key";
/// Raw message payload as UTF-8.
pub const MESSAGE_FIELD: &str = "_message";
/// Payload length in bytes.
pub const MESSAGE_LENGTH_FIELD: &str = "_message_length";
/// Server-side arrival timestamp.
pub const ARRIVAL_TIMESTAMP_FIELD: &str = "_approximate_arrival_timestamp";

/// On-disk description of one stream-backed table.
///
/// Loaded from a JSON file in the table description directory:
///
/// ```json
/// {
///   "table_name": "orders",
///   "schema_name": "prod",
///   "stream_name": "orders-stream",
///   "columns": [{"name": "order_id", "type": "bigint"}]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct KinesisTableDescription {
    pub table_name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    pub stream_name: String,
    #[serde(default)]
    pub columns: Vec<KinesisColumnDescription>,
}

/// A declared data column. Decoding its values out of the message
/// payload is the record decoder's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KinesisColumnDescription {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl KinesisColumnDescription {
    pub fn arrow_type(&self) -> Result<DataType> {
        Ok(match self.type_name.as_str() {
            "bigint" => DataType::Int64,
            "double" => DataType::Float64,
            "boolean" => DataType::Boolean,
            "varchar" => DataType::Utf8,
            other => return Err(KinesisError::UnsupportedColumnType(other.to_string())),
        })
    }
}

/// Identifies a resolved table to the split manager and record set
/// provider. Serializable so the engine can ship it to workers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KinesisTableHandle {
    pub schema_name: String,
    pub table_name: String,
    pub stream_name: String,
}

impl ConnectorTableHandle for KinesisTableHandle {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The synthetic per-record fields appended to every table's schema
/// unless the connector hides them.
pub fn internal_fields() -> Vec<Field> {
    vec![
        Field::new(SHARD_ID_FIELD, DataType::Utf8, false),
        Field::new(SEQUENCE_NUMBER_FIELD, DataType::Utf8, false),
        Field::new(PARTITION_KEY_FIELD, DataType::Utf8, false),
        Field::new(MESSAGE_FIELD, DataType::Utf8, false),
        Field::new(MESSAGE_LENGTH_FIELD, DataType::Int64, false),
        Field::new(
            ARRIVAL_TIMESTAMP_FIELD,
            DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into())),
            false,
        ),
    ]
}

/// Arrow fields for the declared data columns only.
pub fn data_fields(columns: &[KinesisColumnDescription]) -> Result<Fields> {
    let mut fields = Vec::with_capacity(columns.len());
    for column in columns {
        fields.push(Field::new(&column.name, column.arrow_type()?, true));
    }
    Ok(Fields::from(fields))
}

/// Full table schema: declared columns first, then the internal fields
/// unless hidden.
pub fn table_schema(
    columns: &[KinesisColumnDescription],
    hide_internal_columns: bool,
) -> Result<SchemaRef> {
    let mut fields: Vec<Field> = data_fields(columns)?
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    if !hide_internal_columns {
        fields.extend(internal_fields());
    }
    Ok(Arc::new(Schema::new(fields)))
}
