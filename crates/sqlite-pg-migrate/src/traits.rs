//! Trait seams between the orchestrator and the two database drivers.

use crate::error::Result;
use crate::schema::RecordSchema;
use crate::value::Batch;

/// Reads bounded batches of typed records from the source store.
pub trait SourceReader {
    /// Fail fast if the declared field order does not match the live table.
    fn validate_schema(&self, schema: &RecordSchema) -> Result<()>;

    /// Stream one table into `sink` as batches of at most `batch_size`
    /// records each. Empty batches are never yielded. Returns the total
    /// number of rows read.
    ///
    /// The sequence is finite and non-restartable; calling again rereads
    /// the table from the start.
    fn copy_table(
        &self,
        schema: &RecordSchema,
        batch_size: usize,
        sink: &mut dyn FnMut(Batch) -> Result<()>,
    ) -> Result<u64>;

    /// Current row count of one source table.
    fn row_count(&self, table: &str) -> Result<i64>;
}

/// Writes batches of typed records into the destination store.
pub trait TargetWriter {
    /// Write one batch as a single conflict-skipping insert. Returns the
    /// number of rows actually inserted; rows whose `id` already exists at
    /// the destination are silently skipped by the statement.
    fn write_batch(&mut self, schema: &RecordSchema, batch: &Batch) -> Result<u64>;

    /// Current row count of one destination table.
    fn row_count(&mut self, table: &str) -> Result<i64>;
}
