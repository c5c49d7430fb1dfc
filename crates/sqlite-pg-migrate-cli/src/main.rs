//! sqlite-pg-migrate CLI - batched SQLite to PostgreSQL content migration.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sqlite_pg_migrate::{Config, MigrateError, Orchestrator, PgWriter, SqliteReader};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "sqlite-pg-migrate")]
#[command(about = "Batched SQLite to PostgreSQL content migration")]
#[command(version)]
struct Cli {
    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy all five content tables into the destination
    Run {
        /// Path to the source SQLite database
        #[arg(long, default_value = "db.sqlite")]
        db_path: PathBuf,

        /// Rows per read/write batch
        #[arg(long, default_value = "500")]
        batch_size: usize,
    },

    /// Compare source and destination row counts per table
    Validate {
        /// Path to the source SQLite database
        #[arg(long, default_value = "db.sqlite")]
        db_path: PathBuf,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    // Pick up DB_* variables from a local .env file if present.
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Run {
            db_path,
            batch_size,
        } => {
            if batch_size == 0 {
                return Err(MigrateError::Config(
                    "batch size must be at least 1".to_string(),
                ));
            }

            let mut config = Config::from_env()?;
            config.source_path = db_path;
            config.batch_size = batch_size;

            let destination = format!(
                "{}:{}/{}",
                config.target.host, config.target.port, config.target.database
            );
            info!(
                source = %config.source_path.display(),
                destination = %destination,
                "loaded configuration"
            );

            let reader = SqliteReader::open(&config.source_path)?;
            let writer = PgWriter::connect(&config.target)?;

            let report = Orchestrator::new(reader, writer, config.batch_size).run()?;

            println!("\nMigration completed!");
            println!("  Duration: {:.2}s", report.duration_seconds);
            println!("  Tables: {}", report.tables.len());
            println!("  Rows read: {}", report.rows_read());
            println!("  Rows inserted: {}", report.rows_inserted());
            println!("  Rows skipped (already present): {}", report.rows_skipped());
        }

        Commands::Validate { db_path } => {
            let mut config = Config::from_env()?;
            config.source_path = db_path;

            let reader = SqliteReader::open(&config.source_path)?;
            let writer = PgWriter::connect(&config.target)?;

            let results = Orchestrator::new(reader, writer, config.batch_size).validate()?;

            let mut mismatches = 0;
            println!("\nRow counts (source -> destination):");
            for (table, source, destination) in &results {
                let marker = if source == destination {
                    "ok"
                } else {
                    mismatches += 1;
                    "MISMATCH"
                };
                println!("  {table}: {source} -> {destination} ({marker})");
            }

            if mismatches > 0 {
                return Err(MigrateError::Config(format!(
                    "{mismatches} table(s) out of sync"
                )));
            }
        }
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
