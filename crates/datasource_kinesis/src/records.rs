//! Record retrieval: one bounded, lazily-advancing stream per split.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use connector_spi::errors::Result as SpiResult;
use connector_spi::records::ConnectorRecordSetProvider;
use connector_spi::session::ConnectorSession;
use connector_spi::splits::ConnectorSplit;
use datafusion::arrow::array::{ArrayRef, Int64Array, StringArray, TimestampMillisecondArray};
use datafusion::arrow::datatypes::{Fields, SchemaRef};
use datafusion::arrow::record_batch::{RecordBatch, RecordBatchOptions};
use datafusion::error::Result as DatafusionResult;
use datafusion::physical_plan::{RecordBatchStream, SendableRecordBatchStream};
use futures::{Stream, StreamExt};
use tracing::debug;

use crate::checkpoint::{CheckpointStore, ShardCheckpointKey};
use crate::client::{KinesisClient, StartPosition, StreamRecord};
use crate::decode::RecordDecoder;
use crate::errors::{KinesisError, Result};
use crate::metadata::KinesisMetadata;
use crate::session;
use crate::split::KinesisSplit;
use crate::table::{data_fields, table_schema};

/// Serves each split as a record stream, paging through its shard until
/// the session's batch cap is reached, the shard closes, or the read
/// catches up with the stream tip.
pub struct KinesisRecordSetProvider {
    client: Arc<dyn KinesisClient>,
    metadata: Arc<KinesisMetadata>,
    checkpoints: Arc<dyn CheckpointStore>,
    decoder: Arc<dyn RecordDecoder>,
}

impl KinesisRecordSetProvider {
    pub fn new(
        client: Arc<dyn KinesisClient>,
        metadata: Arc<KinesisMetadata>,
        checkpoints: Arc<dyn CheckpointStore>,
        decoder: Arc<dyn RecordDecoder>,
    ) -> Self {
        KinesisRecordSetProvider {
            client,
            metadata,
            checkpoints,
            decoder,
        }
    }
}

#[async_trait]
impl ConnectorRecordSetProvider for KinesisRecordSetProvider {
    async fn record_stream(
        &self,
        split: Arc<dyn ConnectorSplit>,
        session: &ConnectorSession,
        projection: Option<&[usize]>,
    ) -> SpiResult<SendableRecordBatchStream> {
        let split = split
            .as_any()
            .downcast_ref::<KinesisSplit>()
            .cloned()
            .ok_or(KinesisError::ForeignHandle("split"))?;

        let config = self.metadata.connector_config();
        let batch_size = session::batch_size(session, config)?;
        let max_batches = session::max_batches(session, config)?;
        let iteration_number = session::iteration_number(session, config)?;
        let logical_process_name = session::checkpoint_logical_name(session, config)?;

        let schema = table_schema(&split.columns, config.hide_internal_columns)?;
        let fields = data_fields(&split.columns)?;
        let projected_schema = match projection {
            Some(indices) => Arc::new(schema.project(indices).map_err(KinesisError::from)?),
            None => schema.clone(),
        };
        let projection = projection.map(|p| p.to_vec());

        let checkpoint_enabled = config.checkpoint_enabled;
        let checkpoint_key = ShardCheckpointKey {
            logical_process_name,
            iteration_number,
            stream_name: split.stream_name.clone(),
            shard_id: split.shard_id.clone(),
        };
        let start = match checkpoint_enabled {
            true => match self.checkpoints.load(&checkpoint_key) {
                Some(sequence) => {
                    debug!(
                        shard = %split.shard_id,
                        sequence = %sequence,
                        "resuming shard read from checkpoint"
                    );
                    StartPosition::AfterSequenceNumber(sequence)
                }
                None => split.start.clone(),
            },
            false => split.start.clone(),
        };

        let client = self.client.clone();
        let checkpoints = self.checkpoints.clone();
        let decoder = self.decoder.clone();
        let hide_internal_columns = config.hide_internal_columns;

        let stream = async_stream::stream! {
            let mut iterator =
                match client.shard_iterator(&split.stream_name, &split.shard_id, &start).await {
                    Ok(iterator) => iterator,
                    Err(e) => {
                        yield Err(e.into());
                        return;
                    }
                };

            let mut batches_read: u64 = 0;
            let mut last_sequence: Option<String> = None;

            loop {
                if let Some(max) = max_batches {
                    if batches_read >= max {
                        debug!(shard = %split.shard_id, batches = batches_read, "fetch cap reached");
                        break;
                    }
                }

                let page = match client.get_records(&iterator, batch_size).await {
                    Ok(page) => page,
                    Err(e) => {
                        yield Err(e.into());
                        return;
                    }
                };
                batches_read += 1;

                if let Some(record) = page.records.last() {
                    last_sequence = Some(record.sequence_number.clone());
                }

                if !page.records.is_empty() {
                    let batch = build_page_batch(
                        &schema,
                        &fields,
                        &split.shard_id,
                        &page.records,
                        decoder.as_ref(),
                        hide_internal_columns,
                    );
                    let batch = match batch {
                        Ok(batch) => batch,
                        Err(e) => {
                            yield Err(e.into());
                            return;
                        }
                    };
                    let batch = match &projection {
                        Some(indices) => match batch.project(indices) {
                            Ok(batch) => batch,
                            Err(e) => {
                                yield Err(e.into());
                                return;
                            }
                        },
                        None => batch,
                    };
                    yield Ok(batch);
                }

                let caught_up =
                    page.records.is_empty() && page.millis_behind_latest == Some(0);
                match page.next_iterator {
                    Some(next) => iterator = next,
                    None => {
                        debug!(shard = %split.shard_id, "shard closed and drained");
                        break;
                    }
                }
                if caught_up {
                    debug!(shard = %split.shard_id, "caught up with stream tip");
                    break;
                }
            }

            if checkpoint_enabled {
                if let Some(sequence) = last_sequence {
                    debug!(
                        shard = %checkpoint_key.shard_id,
                        sequence = %sequence,
                        "saving shard checkpoint"
                    );
                    checkpoints.save(checkpoint_key, sequence);
                }
            }
        };

        Ok(Box::pin(ShardRecordStream {
            schema: projected_schema,
            inner: Box::pin(stream),
        }))
    }
}

/// Assemble one record batch from a fetched page: decoded data columns
/// first, then the internal columns unless hidden.
fn build_page_batch(
    schema: &SchemaRef,
    fields: &Fields,
    shard_id: &str,
    records: &[StreamRecord],
    decoder: &dyn RecordDecoder,
    hide_internal_columns: bool,
) -> Result<RecordBatch> {
    let mut arrays = decoder.decode(records, fields)?;
    if arrays.len() != fields.len() {
        return Err(KinesisError::Decoder(format!(
            "expected {} arrays, got {}",
            fields.len(),
            arrays.len()
        )));
    }
    for array in &arrays {
        if array.len() != records.len() {
            return Err(KinesisError::Decoder(format!(
                "expected {} rows, got {}",
                records.len(),
                array.len()
            )));
        }
    }

    if !hide_internal_columns {
        arrays.push(Arc::new(StringArray::from_iter_values(
            records.iter().map(|_| shard_id),
        )) as ArrayRef);
        arrays.push(Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.sequence_number.as_str()),
        )));
        arrays.push(Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.partition_key.as_str()),
        )));
        arrays.push(Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| String::from_utf8_lossy(&r.data)),
        )));
        arrays.push(Arc::new(Int64Array::from_iter_values(
            records.iter().map(|r| r.data.len() as i64),
        )));
        arrays.push(Arc::new(
            TimestampMillisecondArray::from_iter_values(
                records.iter().map(|r| r.arrival.timestamp_millis()),
            )
            .with_timezone("UTC"),
        ));
    }

    let options = RecordBatchOptions::new().with_row_count(Some(records.len()));
    Ok(RecordBatch::try_new_with_options(
        schema.clone(),
        arrays,
        &options,
    )?)
}

struct ShardRecordStream {
    schema: SchemaRef,
    inner: Pin<Box<dyn Stream<Item = DatafusionResult<RecordBatch>> + Send>>,
}

impl Stream for ShardRecordStream {
    type Item = DatafusionResult<RecordBatch>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl RecordBatchStream for ShardRecordStream {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }
}
