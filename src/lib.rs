//! PriceFinder: a paginated listing scraper with a deduplicating offer store
//!
//! This crate walks "next page" links on a configured site, extracts offer
//! records from every page, stores them idempotently in SQLite and exports the
//! accumulated store to a spreadsheet file.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod record;
pub mod storage;

use thiserror::Error;

/// Main error type for PriceFinder operations
#[derive(Debug, Error)]
pub enum PriceFinderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Extract(#[from] extract::ExtractError),

    #[error(transparent)]
    Crawl(#[from] crawler::CrawlError),

    #[error(transparent)]
    Storage(#[from] storage::StorageError),

    #[error(transparent)]
    Output(#[from] output::OutputError),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    UrlParse(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector in config: {0}")]
    InvalidSelector(String),
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run, RunOutcome};
pub use record::{Record, StoredOffer};
