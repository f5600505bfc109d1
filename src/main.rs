//! PriceFinder main entry point
//!
//! This is the command-line interface for running scrape jobs.

use anyhow::Context;
use clap::Parser;
use pricefinder::config::{load_config_with_hash, Config};
use pricefinder::crawler::{export_only, run};
use pricefinder::output::{load_statistics, print_statistics};
use pricefinder::storage::SqliteStorage;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// PriceFinder: scrape paginated listings into a deduplicated offer store
///
/// Each run walks the configured site's "next page" links, stores new offers
/// in SQLite and exports the full store to a spreadsheet.
#[derive(Parser, Debug)]
#[command(name = "pricefinder")]
#[command(version)]
#[command(about = "Scrape paginated listings into a deduplicated offer store", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", default_value = "pricefinder.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Export the existing store without crawling
    #[arg(long, conflicts_with = "stats")]
    export_only: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "export_only")]
    stats: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    setup_logging(cli.verbose, cli.quiet, config.output.log_path.as_deref())?;
    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_only {
        export_only(&config)?;
    } else {
        handle_run(&config).await;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr, and also to `log_path` when one is configured.
fn setup_logging(verbose: u8, quiet: bool, log_path: Option<&str>) -> anyhow::Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pricefinder=info,warn"),
            1 => EnvFilter::new("pricefinder=debug,info"),
            2 => EnvFilter::new("pricefinder=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let file_layer = match log_path {
        Some(path) => {
            let path = Path::new(path);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false),
        )
        .with(file_layer)
        .init();

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main scrape run
///
/// A failed run has already been logged and replaced by an empty export, so
/// the process still exits normally.
async fn handle_run(config: &Config) {
    tracing::info!("Starting run at {}", config.crawler.start_url);

    if !run(config).await.is_completed() {
        tracing::warn!(
            "Run did not complete; {} holds an empty export",
            config.output.export_path
        );
    }
}
