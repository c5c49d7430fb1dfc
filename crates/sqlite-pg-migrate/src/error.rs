//! Error types for the migration library.

use thiserror::Error;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (missing environment variable, bad value, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source database connection or query error
    #[error("Source database error: {0}")]
    Source(#[from] rusqlite::Error),

    /// Destination database connection or query error
    #[error("Destination database error: {0}")]
    Target(#[from] postgres::Error),

    /// Declared field order does not match the live source table
    #[error("Schema mismatch for table {table}: declared [{expected}], source has [{actual}]")]
    SchemaMismatch {
        table: String,
        expected: String,
        actual: String,
    },

    /// Source column count does not match the schema's field count
    #[error(
        "Construction failed for table {table}: schema declares {expected} fields, \
         source has {actual} columns"
    )]
    Construction {
        table: String,
        expected: usize,
        actual: usize,
    },

    /// A field value cannot be decoded for transfer
    #[error("Encoding failed for {table}.{column}: {message}")]
    Encoding {
        table: String,
        column: String,
        message: String,
    },
}

impl MigrateError {
    /// Create an Encoding error for a specific table column.
    pub fn encoding(
        table: impl Into<String>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        MigrateError::Encoding {
            table: table.into(),
            column: column.into(),
            message: message.into(),
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
