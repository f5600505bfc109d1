//! CSS selector driven extractor
//!
//! Each listing page is expected to contain repeated item elements. Within an
//! item the title, price and link are located with their own selectors; the
//! next-page link is looked up across the whole document.

use crate::config::SiteConfig;
use crate::extract::{parse_price, ExtractError, ExtractedPage, Extractor};
use crate::record::Record;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Extractor built from a `[site]` configuration table
#[derive(Debug, Clone)]
pub struct SelectorExtractor {
    source_name: String,
    item: Selector,
    title: Selector,
    title_attribute: Option<String>,
    price: Selector,
    link: Selector,
    next: Selector,
}

impl SelectorExtractor {
    /// Compiles every selector of the site configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pricefinder::config::load_config;
    /// use pricefinder::extract::SelectorExtractor;
    /// use std::path::Path;
    ///
    /// let config = load_config(Path::new("pricefinder.toml")).unwrap();
    /// let extractor = SelectorExtractor::new(&config.site).unwrap();
    /// ```
    pub fn new(site: &SiteConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            source_name: site.source_name.trim().to_string(),
            item: compile("item", &site.item_selector)?,
            title: compile("title", &site.title_selector)?,
            title_attribute: site.title_attribute.clone(),
            price: compile("price", &site.price_selector)?,
            link: compile("link", &site.link_selector)?,
            next: compile("next", &site.next_selector)?,
        })
    }

    fn extract_title(&self, item: &ElementRef<'_>) -> String {
        let Some(element) = item.select(&self.title).next() else {
            return String::new();
        };

        self.title_attribute
            .as_deref()
            .and_then(|attribute| element.value().attr(attribute))
            .map(str::to_string)
            .unwrap_or_else(|| element_text(&element))
    }

    fn extract_price(&self, item: &ElementRef<'_>) -> Option<f64> {
        item.select(&self.price)
            .next()
            .and_then(|element| parse_price(&element_text(&element)))
    }

    fn extract_record(
        &self,
        page_url: &Url,
        index: usize,
        item: &ElementRef<'_>,
    ) -> Result<Record, ExtractError> {
        let missing = |field| ExtractError::MissingField {
            page_url: page_url.to_string(),
            index,
            field,
        };

        let link = item.select(&self.link).next().ok_or_else(|| missing("link"))?;
        let href = link.value().attr("href").ok_or_else(|| missing("link href"))?;
        let target_url = resolve_link(href, page_url).ok_or_else(|| missing("link href"))?;

        Record::new(
            &self.source_name,
            self.extract_title(item),
            self.extract_price(item),
            target_url.as_str(),
        )
        .map_err(|source| ExtractError::InvalidRecord {
            page_url: page_url.to_string(),
            index,
            source,
        })
    }
}

impl Extractor for SelectorExtractor {
    fn extract(&self, page_url: &Url, content: &str) -> Result<ExtractedPage, ExtractError> {
        let document = Html::parse_document(content);

        let records = document
            .select(&self.item)
            .enumerate()
            .map(|(index, item)| self.extract_record(page_url, index, &item))
            .collect::<Result<Vec<_>, _>>()?;

        let next_url = document
            .select(&self.next)
            .next()
            .and_then(|element| element.value().attr("href"))
            .and_then(|href| resolve_link(href, page_url));

        Ok(ExtractedPage { records, next_url })
    }
}

fn compile(field: &'static str, selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::Selector {
        field,
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Element text with runs of whitespace collapsed to single spaces
fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves a link href to an absolute http(s) URL
///
/// Returns None for empty hrefs, fragment-only links, non-HTTP schemes and
/// anything that does not parse.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url),
        _ => None,
    }
}
