//! Crawler module for fetching listing pages and running scrape jobs
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - The pagination loop over "next page" links
//! - The run entry point tying crawl, storage and export together

mod fetcher;
mod paginator;

pub use fetcher::{
    build_http_client, fetch_once, FetchError, FetchResult, Fetcher, PageSource, RetryPolicy,
};
pub use paginator::{CrawlError, CrawlOutput, Paginator};

use crate::config::{validate, Config};
use crate::extract::SelectorExtractor;
use crate::output::{export_offers, write_empty_export};
use crate::storage::{open_storage, Storage};
use crate::PriceFinderError;
use std::path::Path;
use url::Url;

/// Counts reported by a successful run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pages: usize,
    pub records: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub exported: usize,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// The run hit a fatal error; an empty export was written in its place
    Failed { error: String },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Runs one complete scrape job
///
/// This is the main entry point for a run. It will:
/// 1. Validate the configuration and open the offer store
/// 2. Crawl from the configured start URL
/// 3. Save the crawled records
/// 4. Export the whole store
///
/// Fatal errors are not returned. They are logged with their full cause chain
/// and an empty export is written so a file always exists at the export path.
pub async fn run(config: &Config) -> RunOutcome {
    match execute(config).await {
        Ok(summary) => {
            tracing::info!(
                "Run complete: {} pages, {} records, {} new offers, {} duplicates, {} rows exported",
                summary.pages,
                summary.records,
                summary.inserted,
                summary.duplicates,
                summary.exported
            );
            RunOutcome::Completed(summary)
        }
        Err(e) => {
            let error = anyhow::Error::from(e);
            tracing::error!("Run failed: {:?}", error);

            let export_path = Path::new(&config.output.export_path);
            match write_empty_export(export_path) {
                Ok(()) => tracing::info!("Wrote empty export to {}", export_path.display()),
                Err(write_error) => tracing::error!(
                    "Failed to write empty export to {}: {}",
                    export_path.display(),
                    write_error
                ),
            }

            RunOutcome::Failed {
                error: format!("{:#}", error),
            }
        }
    }
}

/// Runs a scrape job, propagating the first fatal error
pub async fn execute(config: &Config) -> Result<RunSummary, PriceFinderError> {
    validate(config)?;
    let start_url = Url::parse(&config.crawler.start_url)?;
    let mut storage = open_storage(Path::new(&config.output.database_path))?;
    let fetcher = Fetcher::from_config(config)?;
    let extractor = SelectorExtractor::new(&config.site)?;

    let crawl = Paginator::new(&fetcher, &extractor)
        .with_max_pages(config.crawler.max_pages)
        .crawl(&start_url)
        .await?;

    let saved = storage.save(&crawl.records)?;
    tracing::info!(
        "Saved {} of {} offers ({} already stored)",
        saved.inserted,
        saved.attempted(),
        saved.duplicates
    );

    let exported = export_offers(&storage, Path::new(&config.output.export_path))?;

    Ok(RunSummary {
        pages: crawl.pages,
        records: crawl.records.len(),
        inserted: saved.inserted,
        duplicates: saved.duplicates,
        exported,
    })
}

/// Re-exports the current store without crawling
pub fn export_only(config: &Config) -> Result<usize, PriceFinderError> {
    validate(config)?;
    let storage = open_storage(Path::new(&config.output.database_path))?;
    let exported = export_offers(&storage, Path::new(&config.output.export_path))?;
    tracing::info!(
        "Exported {} offers to {}",
        exported,
        config.output.export_path
    );
    Ok(exported)
}
