//! PostgreSQL destination writer.

use postgres::types::ToSql;
use postgres::{Client, NoTls};
use tracing::debug;

use crate::config::TargetConfig;
use crate::error::Result;
use crate::schema::RecordSchema;
use crate::traits::TargetWriter;
use crate::value::Batch;

/// Writes batches into the destination database.
///
/// Owns the destination connection for the life of the run. Each batch
/// becomes one multi-row `INSERT ... ON CONFLICT (id) DO NOTHING`, executed
/// inside its own transaction so a failed batch never half-commits.
pub struct PgWriter {
    client: Client,
    target_schema: String,
}

impl PgWriter {
    /// Connect using the configured destination parameters.
    pub fn connect(config: &TargetConfig) -> Result<Self> {
        let client = Client::connect(&config.connection_string(), NoTls)?;
        debug!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "connected to destination"
        );
        Ok(Self {
            client,
            target_schema: config.schema.clone(),
        })
    }
}

impl TargetWriter for PgWriter {
    fn write_batch(&mut self, schema: &RecordSchema, batch: &Batch) -> Result<u64> {
        if batch.is_empty() {
            return Ok(0);
        }

        let sql = build_insert_sql(&self.target_schema, schema, batch.len());
        let params: Vec<&(dyn ToSql + Sync)> = batch
            .rows()
            .iter()
            .flat_map(|record| record.values().iter().map(|v| v as &(dyn ToSql + Sync)))
            .collect();

        let mut tx = self.client.transaction()?;
        let inserted = tx.execute(&sql, &params)?;
        tx.commit()?;

        debug!(
            table = schema.table,
            rows = batch.len(),
            inserted,
            "batch written"
        );
        Ok(inserted)
    }

    fn row_count(&mut self, table: &str) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {}.{}",
            quote_ident(&self.target_schema),
            quote_ident(table)
        );
        let row = self.client.query_one(&sql, &[])?;
        Ok(row.get(0))
    }
}

/// Quote a PostgreSQL identifier.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build the multi-row conflict-skipping insert for one batch.
///
/// Placeholders are numbered row-major so the flattened record values bind
/// positionally.
fn build_insert_sql(target_schema: &str, schema: &RecordSchema, rows: usize) -> String {
    let columns: Vec<String> = schema.fields.iter().map(|f| quote_ident(f.name)).collect();
    let width = columns.len();

    let mut tuples = Vec::with_capacity(rows);
    for row in 0..rows {
        let placeholders: Vec<String> = (0..width)
            .map(|col| format!("${}", row * width + col + 1))
            .collect();
        tuples.push(format!("({})", placeholders.join(", ")));
    }

    format!(
        "INSERT INTO {}.{} ({}) VALUES {} ON CONFLICT (id) DO NOTHING",
        quote_ident(target_schema),
        quote_ident(schema.table),
        columns.join(", "),
        tuples.join(", ")
    )
}
