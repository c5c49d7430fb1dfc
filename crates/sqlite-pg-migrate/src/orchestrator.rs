//! Sequential migration loop over the fixed table bindings.

use std::time::Instant;

use tracing::{info, warn};

use crate::error::Result;
use crate::schema::table_bindings;
use crate::traits::{SourceReader, TargetWriter};

/// Outcome of migrating one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table: String,

    /// Rows read from the source.
    pub rows_read: u64,

    /// Rows actually inserted at the destination.
    pub rows_inserted: u64,

    /// Rows skipped because their `id` already existed.
    pub rows_skipped: u64,
}

/// Summary of one migration run.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    /// Per-table outcomes, in binding order.
    pub tables: Vec<TableReport>,

    /// Total wall-clock duration in seconds.
    pub duration_seconds: f64,
}

impl MigrationReport {
    pub fn rows_read(&self) -> u64 {
        self.tables.iter().map(|t| t.rows_read).sum()
    }

    pub fn rows_inserted(&self) -> u64 {
        self.tables.iter().map(|t| t.rows_inserted).sum()
    }

    pub fn rows_skipped(&self) -> u64 {
        self.tables.iter().map(|t| t.rows_skipped).sum()
    }
}

/// Drives source batches into the destination, one table at a time.
///
/// Strictly sequential: table N+1 does not start until table N is
/// exhausted, and batches are written in the order they are read. Any
/// error from either side aborts the whole run.
pub struct Orchestrator<R, W> {
    reader: R,
    writer: W,
    batch_size: usize,
}

impl<R: SourceReader, W: TargetWriter> Orchestrator<R, W> {
    pub fn new(reader: R, writer: W, batch_size: usize) -> Self {
        Self {
            reader,
            writer,
            batch_size,
        }
    }

    /// Run the full migration across the fixed table bindings, in binding
    /// order.
    pub fn run(&mut self) -> Result<MigrationReport> {
        let started = Instant::now();
        let bindings = table_bindings();
        info!(
            tables = bindings.len(),
            batch_size = self.batch_size,
            "starting migration"
        );

        let mut tables = Vec::with_capacity(bindings.len());
        for schema in bindings {
            self.reader.validate_schema(schema)?;

            let reader = &self.reader;
            let writer = &mut self.writer;
            let mut rows_inserted = 0u64;
            let rows_read = reader.copy_table(schema, self.batch_size, &mut |batch| {
                rows_inserted += writer.write_batch(schema, &batch)?;
                Ok(())
            })?;

            let rows_skipped = rows_read - rows_inserted;
            info!(
                table = schema.table,
                rows_read, rows_inserted, rows_skipped, "table migrated"
            );
            tables.push(TableReport {
                table: schema.table.to_string(),
                rows_read,
                rows_inserted,
                rows_skipped,
            });
        }

        let report = MigrationReport {
            tables,
            duration_seconds: started.elapsed().as_secs_f64(),
        };
        info!(
            rows_read = report.rows_read(),
            rows_inserted = report.rows_inserted(),
            rows_skipped = report.rows_skipped(),
            "migration completed in {:.2}s",
            report.duration_seconds
        );
        Ok(report)
    }

    /// Compare source and destination row counts for every bound table.
    ///
    /// Returns `(table, source, destination)` triples in binding order;
    /// mismatches are logged but not treated as errors here.
    pub fn validate(&mut self) -> Result<Vec<(String, i64, i64)>> {
        let mut results = Vec::with_capacity(table_bindings().len());
        for schema in table_bindings() {
            let source = self.reader.row_count(schema.table)?;
            let destination = self.writer.row_count(schema.table)?;
            if source == destination {
                info!(table = schema.table, rows = source, "row counts match");
            } else {
                warn!(
                    table = schema.table,
                    source, destination, "row count mismatch"
                );
            }
            results.push((schema.table.to_string(), source, destination));
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigrateError;
    use crate::schema::RecordSchema;
    use crate::value::{Batch, SqlValue, TypedRecord};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn record(id: u128, name: &str) -> TypedRecord {
        TypedRecord::new(vec![
            SqlValue::Uuid(Uuid::from_u128(id)),
            SqlValue::Text(name.to_string()),
        ])
    }

    /// In-memory source: a fixed row list per table.
    #[derive(Default)]
    struct FakeReader {
        tables: HashMap<&'static str, Vec<TypedRecord>>,
        visited: RefCell<Vec<&'static str>>,
    }

    impl SourceReader for FakeReader {
        fn validate_schema(&self, _schema: &RecordSchema) -> Result<()> {
            Ok(())
        }

        fn copy_table(
            &self,
            schema: &RecordSchema,
            batch_size: usize,
            sink: &mut dyn FnMut(Batch) -> Result<()>,
        ) -> Result<u64> {
            self.visited.borrow_mut().push(schema.table);
            let rows = self.tables.get(schema.table).cloned().unwrap_or_default();
            let total = rows.len() as u64;
            for chunk in rows.chunks(batch_size) {
                sink(Batch::new(chunk.to_vec()))?;
            }
            Ok(total)
        }

        fn row_count(&self, table: &str) -> Result<i64> {
            Ok(self.tables.get(table).map_or(0, |rows| rows.len() as i64))
        }
    }

    /// In-memory destination with conflict-skip on the first value (`id`).
    #[derive(Default)]
    struct FakeWriter {
        tables: HashMap<String, Vec<TypedRecord>>,
        batches_written: usize,
        fail_on: Option<&'static str>,
    }

    impl TargetWriter for FakeWriter {
        fn write_batch(&mut self, schema: &RecordSchema, batch: &Batch) -> Result<u64> {
            if self.fail_on == Some(schema.table) {
                return Err(MigrateError::Config("injected failure".to_string()));
            }

            self.batches_written += 1;
            let rows = self.tables.entry(schema.table.to_string()).or_default();
            let mut inserted = 0u64;
            for record in batch.rows() {
                let id = &record.values()[0];
                if !rows.iter().any(|r| &r.values()[0] == id) {
                    rows.push(record.clone());
                    inserted += 1;
                }
            }
            Ok(inserted)
        }

        fn row_count(&mut self, table: &str) -> Result<i64> {
            Ok(self.tables.get(table).map_or(0, |rows| rows.len() as i64))
        }
    }

    #[test]
    fn test_genre_scenario() {
        let mut reader = FakeReader::default();
        reader
            .tables
            .insert("genre", vec![record(1, "Drama"), record(2, "Comedy")]);

        let mut orchestrator = Orchestrator::new(reader, FakeWriter::default(), 500);
        let report = orchestrator.run().unwrap();

        assert_eq!(report.rows_read(), 2);
        assert_eq!(report.rows_inserted(), 2);
        assert_eq!(report.rows_skipped(), 0);
        assert_eq!(
            orchestrator.writer.tables["genre"],
            vec![record(1, "Drama"), record(2, "Comedy")]
        );
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let mut reader = FakeReader::default();
        reader
            .tables
            .insert("genre", vec![record(1, "Drama"), record(2, "Comedy")]);

        let mut orchestrator = Orchestrator::new(reader, FakeWriter::default(), 500);
        orchestrator.run().unwrap();
        let second = orchestrator.run().unwrap();

        assert_eq!(second.rows_read(), 2);
        assert_eq!(second.rows_inserted(), 0);
        assert_eq!(second.rows_skipped(), 2);
        assert_eq!(orchestrator.writer.tables["genre"].len(), 2);
    }

    #[test]
    fn test_tables_visited_in_binding_order() {
        let mut orchestrator =
            Orchestrator::new(FakeReader::default(), FakeWriter::default(), 500);
        orchestrator.run().unwrap();

        assert_eq!(
            *orchestrator.reader.visited.borrow(),
            vec![
                "film_work",
                "genre",
                "person",
                "genre_film_work",
                "person_film_work"
            ]
        );
    }

    #[test]
    fn test_batch_count_follows_batch_size() {
        let mut reader = FakeReader::default();
        reader.tables.insert(
            "genre",
            (1..=5).map(|i| record(i, "g")).collect(),
        );

        let mut orchestrator = Orchestrator::new(reader, FakeWriter::default(), 2);
        orchestrator.run().unwrap();

        // 5 rows at batch size 2: three batches for genre, none elsewhere.
        assert_eq!(orchestrator.writer.batches_written, 3);
    }

    #[test]
    fn test_failure_aborts_run() {
        let mut reader = FakeReader::default();
        reader.tables.insert("genre", vec![record(1, "Drama")]);
        reader.tables.insert("person", vec![record(2, "Someone")]);

        let writer = FakeWriter {
            fail_on: Some("genre"),
            ..FakeWriter::default()
        };

        let mut orchestrator = Orchestrator::new(reader, writer, 500);
        let err = orchestrator.run().unwrap_err();
        assert!(err.to_string().contains("injected failure"));

        // Migration stopped at genre; person was never reached.
        assert_eq!(
            *orchestrator.reader.visited.borrow(),
            vec!["film_work", "genre"]
        );
    }

    #[test]
    fn test_validate_reports_counts() {
        let mut reader = FakeReader::default();
        reader
            .tables
            .insert("genre", vec![record(1, "Drama"), record(2, "Comedy")]);

        let mut orchestrator = Orchestrator::new(reader, FakeWriter::default(), 500);
        orchestrator.run().unwrap();
        let results = orchestrator.validate().unwrap();

        let genre = results.iter().find(|(t, _, _)| t == "genre").unwrap();
        assert_eq!((genre.1, genre.2), (2, 2));
    }
}
