//! SQLite source reader.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::error::{MigrateError, Result};
use crate::schema::RecordSchema;
use crate::traits::SourceReader;
use crate::value::{Batch, SqlValue, TypedRecord};

/// Reads batches of typed records from the source SQLite database.
///
/// Owns the source connection for the life of the migration run; the
/// connection closes when the reader is dropped, on every exit path.
pub struct SqliteReader {
    conn: Connection,
}

impl SqliteReader {
    /// Open the source database file read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open_with_flags(path.as_ref(), OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self { conn })
    }

    /// Wrap an existing connection. Tests use an in-memory database.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

impl SourceReader for SqliteReader {
    /// Check the declared field order against the live table layout.
    ///
    /// Positional mapping silently misassigns values on a mismatch, so this
    /// runs once per table before any row is read. A column-count difference
    /// is a construction failure; same count with different names or order
    /// is a schema mismatch.
    fn validate_schema(&self, schema: &RecordSchema) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", schema.table))?;
        let actual: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<std::result::Result<_, _>>()?;

        let expected = schema.field_names();
        if actual.len() != expected.len() {
            return Err(MigrateError::Construction {
                table: schema.table.to_string(),
                expected: expected.len(),
                actual: actual.len(),
            });
        }
        if !actual.iter().map(String::as_str).eq(expected.iter().copied()) {
            return Err(MigrateError::SchemaMismatch {
                table: schema.table.to_string(),
                expected: expected.join(", "),
                actual: actual.join(", "),
            });
        }

        Ok(())
    }

    fn copy_table(
        &self,
        schema: &RecordSchema,
        batch_size: usize,
        sink: &mut dyn FnMut(Batch) -> Result<()>,
    ) -> Result<u64> {
        let sql = format!("SELECT {} FROM {}", schema.column_list(), schema.table);
        let mut stmt = self.conn.prepare(&sql)?;

        let mut rows = stmt.query([])?;
        let mut buf: Vec<TypedRecord> = Vec::with_capacity(batch_size);
        let mut total = 0u64;

        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(schema.field_count());
            for (idx, field) in schema.fields.iter().enumerate() {
                let raw = row.get_ref(idx)?;
                let value =
                    SqlValue::decode(raw, field).map_err(|message| MigrateError::Encoding {
                        table: schema.table.to_string(),
                        column: field.name.to_string(),
                        message,
                    })?;
                values.push(value);
            }
            buf.push(TypedRecord::new(values));
            total += 1;

            if buf.len() == batch_size {
                let full = std::mem::replace(&mut buf, Vec::with_capacity(batch_size));
                sink(Batch::new(full))?;
            }
        }

        if !buf.is_empty() {
            sink(Batch::new(buf))?;
        }

        debug!(table = schema.table, rows = total, "source table exhausted");
        Ok(total)
    }

    fn row_count(&self, table: &str) -> Result<i64> {
        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count)
    }
}
