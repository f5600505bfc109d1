//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the identifying user agent string
//! - GET requests to fetch page content
//! - Retry with linear backoff for failed attempts
//! - Error classification

use crate::config::{Config, UserAgentConfig};
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Terminal fetch failure; fatal for the current run
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(
        "Giving up on {url} after {attempts} attempts: {}",
        describe_failure(.last_status, .last_error)
    )]
    Exhausted {
        url: String,
        attempts: u32,
        /// Last HTTP status observed across all attempts
        last_status: Option<u16>,
        /// Transport error of the most recent attempt that had one
        last_error: Option<String>,
    },
}

fn describe_failure(last_status: &Option<u16>, last_error: &Option<String>) -> String {
    match (last_status, last_error) {
        (Some(status), _) => format!("last status {}", status),
        (None, Some(error)) => format!("last error: {}", error),
        (None, None) => "no response".to_string(),
    }
}

impl FetchError {
    /// The last HTTP status seen before giving up, if any
    pub fn last_status(&self) -> Option<u16> {
        match self {
            Self::Exhausted { last_status, .. } => *last_status,
            Self::InvalidUrl { .. } => None,
        }
    }
}

/// Result of a single fetch attempt
#[derive(Debug)]
pub enum FetchResult {
    /// HTTP 200 with its body
    Success { body: String },

    /// Any other HTTP status
    HttpError { status_code: u16 },

    /// Network error (connection refused, timeout, unreadable body, etc.)
    NetworkError { error: String },
}

/// How many times to try a page and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one; at least 1
    pub max_attempts: u32,
    /// Attempt `n` failing is followed by a wait of `n * backoff_step`
    pub backoff_step: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_step,
        }
    }

    /// Wait after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Anything the paginator can pull page content from
pub trait PageSource {
    fn fetch_page(&self, url: &Url) -> impl Future<Output = Result<String, FetchError>>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Per-request timeout
///
/// # Example
///
/// ```no_run
/// use pricefinder::config::UserAgentConfig;
/// use pricefinder::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     client_name: "PriceFinder".to_string(),
///     client_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(20)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Page fetcher with bounded retries
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Builds the client and retry policy from configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, config.crawler.request_timeout())?;
        let policy = RetryPolicy::new(config.crawler.max_attempts, config.crawler.backoff_step());
        Ok(Self::new(client, policy))
    }

    /// Fetches an absolute http(s) URL given as text
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = parse_absolute_url(url)?;
        self.fetch_url(&parsed).await
    }

    /// Fetches a URL, retrying until a 200 response or the attempts run out
    ///
    /// | Attempt fails | Then |
    /// |---------------|------|
    /// | 1 | wait 1 × step, retry |
    /// | 2 | wait 2 × step, retry |
    /// | last | `FetchError::Exhausted` |
    pub async fn fetch_url(&self, url: &Url) -> Result<String, FetchError> {
        let mut last_status = None;
        let mut last_error = None;

        for attempt in 1..=self.policy.max_attempts {
            tracing::debug!(attempt, "GET {}", url);

            match fetch_once(&self.client, url).await {
                FetchResult::Success { body } => return Ok(body),
                FetchResult::HttpError { status_code } => {
                    tracing::warn!(attempt, status_code, "Unexpected status from {}", url);
                    last_status = Some(status_code);
                }
                FetchResult::NetworkError { error } => {
                    tracing::warn!(attempt, %error, "Request to {} failed", url);
                    last_error = Some(error);
                }
            }

            if attempt < self.policy.max_attempts {
                let delay = self.policy.delay_after(attempt);
                tracing::info!("Retrying {} in {}ms", url, delay.as_millis());
                tokio::time::sleep(delay).await;
            }
        }

        let error = FetchError::Exhausted {
            url: url.to_string(),
            attempts: self.policy.max_attempts,
            last_status,
            last_error,
        };
        tracing::error!("{}", error);
        Err(error)
    }
}

impl PageSource for Fetcher {
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError> {
        self.fetch_url(url).await
    }
}

/// Sends one GET request and classifies the outcome
pub async fn fetch_once(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    if status != StatusCode::OK {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success { body },
        Err(e) => FetchResult::NetworkError {
            error: format!("Failed to read body: {}", e),
        },
    }
}

fn parse_absolute_url(url: &str) -> Result<Url, FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: url.to_string(),
        reason,
    };

    let parsed = Url::parse(url.trim()).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}
