use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for PriceFinder
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub site: SiteConfig,
    pub output: OutputConfig,
}

/// Crawl loop and retry behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// First listing page of the crawl
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Total attempts per page, including the first one
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff unit; attempt `n` failing waits `n * step` before the next one
    #[serde(rename = "backoff-step-ms", default = "default_backoff_step_ms")]
    pub backoff_step_ms: u64,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Optional upper bound on pages visited in one crawl
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,
}

impl CrawlerConfig {
    pub fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.backoff_step_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_step_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    20
}

/// Client identification sent with every request
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(rename = "client-name")]
    pub client_name: String,

    #[serde(rename = "client-version")]
    pub client_version: String,

    /// URL with information about the client
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.client_name, self.client_version, self.contact_url
        )
    }
}

/// CSS selectors describing one site's listing markup
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Value stored as `source_name` on every extracted record
    #[serde(rename = "source-name")]
    pub source_name: String,

    /// Selects one element per offer on a listing page
    #[serde(rename = "item-selector")]
    pub item_selector: String,

    /// Relative to the item element
    #[serde(rename = "title-selector")]
    pub title_selector: String,

    /// Read the title from this attribute instead of the element text
    #[serde(rename = "title-attribute", default)]
    pub title_attribute: Option<String>,

    /// Relative to the item element
    #[serde(rename = "price-selector")]
    pub price_selector: String,

    /// Relative to the item element; the `href` is the offer's target URL
    #[serde(rename = "link-selector")]
    pub link_selector: String,

    /// Document-wide; the `href` of the first match is the next page
    #[serde(rename = "next-selector")]
    pub next_selector: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the exported spreadsheet (`.csv` or `.tsv`)
    #[serde(rename = "export-path")]
    pub export_path: String,

    /// Optional run log file, written in addition to stderr
    #[serde(rename = "log-path", default)]
    pub log_path: Option<String>,
}
