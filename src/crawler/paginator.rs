//! Pagination loop
//!
//! Starting from one listing URL, fetch a page, extract its records and the
//! next-page link, and repeat until no next link is produced. Records come out
//! in extraction order. The loop trusts the extractor's next link and keeps no
//! visited set; an extractor that links back to an earlier page loops until
//! `max_pages` (when configured) stops it.

use crate::crawler::fetcher::{FetchError, PageSource};
use crate::extract::{ExtractError, Extractor};
use crate::record::Record;
use thiserror::Error;
use url::Url;

/// Fatal crawl failures
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to extract records from {url}")]
    Extract { url: String, source: ExtractError },
}

/// Everything one crawl produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlOutput {
    /// Number of pages fetched
    pub pages: usize,
    /// Records from all pages, page order then document order
    pub records: Vec<Record>,
}

/// Walks "next page" links with a page source and an extractor
pub struct Paginator<'a, S, E> {
    source: &'a S,
    extractor: &'a E,
    max_pages: Option<u32>,
}

impl<'a, S, E> Paginator<'a, S, E>
where
    S: PageSource,
    E: Extractor,
{
    pub fn new(source: &'a S, extractor: &'a E) -> Self {
        Self {
            source,
            extractor,
            max_pages: None,
        }
    }

    /// Stops the crawl after this many pages even if a next link exists
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Runs the crawl from `start_url`
    ///
    /// Each call starts from scratch. A fetch or extraction failure ends the
    /// crawl and discards the records gathered so far.
    pub async fn crawl(&self, start_url: &Url) -> Result<CrawlOutput, CrawlError> {
        let mut output = CrawlOutput::default();
        let mut current_url = Some(start_url.clone());

        while let Some(url) = current_url.take() {
            if self
                .max_pages
                .is_some_and(|limit| output.pages >= limit as usize)
            {
                tracing::warn!(
                    "Page limit of {} reached, not following {}",
                    output.pages,
                    url
                );
                break;
            }

            tracing::info!("Fetching {}", url);
            let content = self.source.fetch_page(&url).await?;
            output.pages += 1;

            let page = self
                .extractor
                .extract(&url, &content)
                .map_err(|source| CrawlError::Extract {
                    url: url.to_string(),
                    source,
                })?;

            tracing::info!("Parsed {} records from {}", page.records.len(), url);
            output.records.extend(page.records);
            current_url = page.next_url;
        }

        tracing::info!(
            "Crawl finished: {} pages, {} records",
            output.pages,
            output.records.len()
        );
        Ok(output)
    }
}
