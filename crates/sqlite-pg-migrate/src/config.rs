//! Configuration loaded from process environment variables.

use std::env;
use std::path::PathBuf;

use crate::error::{MigrateError, Result};

/// Destination schema all target tables live under.
pub const TARGET_SCHEMA: &str = "content";

/// Default path of the source SQLite database.
pub const DEFAULT_SOURCE_PATH: &str = "db.sqlite";

/// Default rows per read/write batch.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Destination database (PostgreSQL) configuration.
///
/// Built once at startup and passed by reference into the writer; nothing
/// reads process environment after construction.
#[derive(Debug, Clone)]
pub struct TargetConfig {
    /// Database host (default: 127.0.0.1).
    pub host: String,

    /// Database port (default: 5432).
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,

    /// Target schema (always "content").
    pub schema: String,
}

impl TargetConfig {
    /// Build from the `DB_*` process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .ok_or_else(|| MigrateError::Config(format!("missing environment variable {name}")))
        };

        let port = match lookup("DB_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| MigrateError::Config(format!("invalid DB_PORT value: {raw}")))?,
            None => 5432,
        };

        Ok(Self {
            host: lookup("DB_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            database: required("DB_NAME")?,
            user: required("DB_USER")?,
            password: required("DB_PASSWORD")?,
            schema: TARGET_SCHEMA.to_string(),
        })
    }

    /// Build a connection string for the postgres client.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            self.host, self.port, self.database, self.user, self.password
        )
    }
}

/// Full migration configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the source SQLite database.
    pub source_path: PathBuf,

    /// Rows per read/write batch.
    pub batch_size: usize,

    /// Destination connection parameters.
    pub target: TargetConfig,
}

impl Config {
    /// Load destination parameters from the environment and fill in the
    /// source-side defaults.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
            batch_size: DEFAULT_BATCH_SIZE,
            target: TargetConfig::from_env()?,
        })
    }
}
