//! Turning listing-page markup into offer records
//!
//! The crawl loop knows nothing about a site's markup. It hands each page to
//! an [`Extractor`], which returns the page's records and the link to the next
//! page, if any. [`SelectorExtractor`] is the stock implementation driven by
//! CSS selectors from the `[site]` configuration table.

mod price;
mod selector;

pub use price::parse_price;
pub use selector::SelectorExtractor;

use crate::record::{Record, RecordError};
use thiserror::Error;
use url::Url;

/// Errors raised while extracting records from a page
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid {field} selector '{selector}': {message}")]
    Selector {
        field: &'static str,
        selector: String,
        message: String,
    },

    #[error("Item {index} on {page_url} has no {field}")]
    MissingField {
        page_url: String,
        index: usize,
        field: &'static str,
    },

    #[error("Item {index} on {page_url} is not a valid record")]
    InvalidRecord {
        page_url: String,
        index: usize,
        source: RecordError,
    },
}

/// Records found on one page plus the link to the following page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPage {
    pub records: Vec<Record>,
    pub next_url: Option<Url>,
}

/// Site-specific mapping from page content to records
///
/// Implementations must be pure: no I/O, same output for the same input.
/// `page_url` is the address the content was fetched from and is only used to
/// resolve relative links.
pub trait Extractor {
    fn extract(&self, page_url: &Url, content: &str) -> Result<ExtractedPage, ExtractError>;
}

impl<F> Extractor for F
where
    F: Fn(&Url, &str) -> Result<ExtractedPage, ExtractError>,
{
    fn extract(&self, page_url: &Url, content: &str) -> Result<ExtractedPage, ExtractError> {
        self(page_url, content)
    }
}
