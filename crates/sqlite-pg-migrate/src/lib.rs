//! # sqlite-pg-migrate
//!
//! Batched SQLite to PostgreSQL migration for the movies content database.
//!
//! Reads the five content tables (`film_work`, `genre`, `person`,
//! `genre_film_work`, `person_film_work`) from a SQLite file in bounded
//! batches and writes each batch to `content.<table>` as one multi-row
//! `INSERT ... ON CONFLICT (id) DO NOTHING`. Rows whose `id` already
//! exists at the destination are skipped, so rerunning the migration never
//! duplicates data.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sqlite_pg_migrate::{Config, Orchestrator, PgWriter, SqliteReader};
//!
//! fn main() -> sqlite_pg_migrate::Result<()> {
//!     let config = Config::from_env()?;
//!     let reader = SqliteReader::open(&config.source_path)?;
//!     let writer = PgWriter::connect(&config.target)?;
//!     let report = Orchestrator::new(reader, writer, config.batch_size).run()?;
//!     println!("migrated {} rows", report.rows_inserted());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod schema;
pub mod source;
pub mod target;
pub mod traits;
pub mod value;

// Re-exports for convenient access
pub use config::{Config, TargetConfig, DEFAULT_BATCH_SIZE, DEFAULT_SOURCE_PATH, TARGET_SCHEMA};
pub use error::{MigrateError, Result};
pub use orchestrator::{MigrationReport, Orchestrator, TableReport};
pub use schema::{table_bindings, Field, FieldType, RecordSchema};
pub use source::SqliteReader;
pub use target::PgWriter;
pub use traits::{SourceReader, TargetWriter};
pub use value::{Batch, SqlValue, TypedRecord};
