//! Record decoding seam.

use datafusion::arrow::array::ArrayRef;
use datafusion::arrow::datatypes::Fields;

use crate::client::StreamRecord;
use crate::errors::{KinesisError, Result};

/// Decodes message payloads into arrays for a table's declared data
/// columns.
///
/// The record set provider calls this once per fetched page with the
/// declared (non-internal) fields; the returned arrays must match those
/// fields in order, length, and type. Format-aware implementations are
/// injected by the embedding engine.
pub trait RecordDecoder: Send + Sync {
    fn decode(&self, records: &[StreamRecord], data_fields: &Fields) -> Result<Vec<ArrayRef>>;
}

/// Default decoder: leaves payloads to the internal `_message` column.
///
/// Supports only tables that declare no data columns; anything else
/// needs an injected decoder.
#[derive(Debug, Default)]
pub struct RawMessageDecoder;

impl RecordDecoder for RawMessageDecoder {
    fn decode(&self, _records: &[StreamRecord], data_fields: &Fields) -> Result<Vec<ArrayRef>> {
        if !data_fields.is_empty() {
            return Err(KinesisError::DecoderUnsupported {
                declared: data_fields.len(),
            });
        }
        Ok(Vec::new())
    }
}
