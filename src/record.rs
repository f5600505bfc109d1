//! Offer records before and after persistence

use thiserror::Error;

/// Errors raised when a record is missing a required field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("source_name is empty")]
    EmptySourceName,

    #[error("target_url is empty")]
    EmptyTargetUrl,
}

/// A scraped item prior to persistence
///
/// String fields are trimmed on construction. `source_name` and `target_url`
/// are never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    source_name: String,
    title: String,
    numeric_value: Option<f64>,
    target_url: String,
}

impl Record {
    pub fn new(
        source_name: impl AsRef<str>,
        title: impl AsRef<str>,
        numeric_value: Option<f64>,
        target_url: impl AsRef<str>,
    ) -> Result<Self, RecordError> {
        let source_name = source_name.as_ref().trim();
        let target_url = target_url.as_ref().trim();

        if source_name.is_empty() {
            return Err(RecordError::EmptySourceName);
        }
        if target_url.is_empty() {
            return Err(RecordError::EmptyTargetUrl);
        }

        Ok(Self {
            source_name: source_name.to_string(),
            title: title.as_ref().trim().to_string(),
            numeric_value,
            target_url: target_url.to_string(),
        })
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn numeric_value(&self) -> Option<f64> {
        self.numeric_value
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    /// Deduplication fingerprint of this record, see [`dedup_key`]
    pub fn dedup_key(&self) -> String {
        dedup_key(&self.source_name, &self.target_url)
    }
}

/// Separator between source name and target URL in a dedup key
pub const DEDUP_KEY_SEPARATOR: &str = "::";

/// Lowercased, trimmed `source_name::target_url`
///
/// Two records with the same source and URL, ignoring case and surrounding
/// whitespace, share a key.
pub fn dedup_key(source_name: &str, target_url: &str) -> String {
    format!(
        "{}{}{}",
        source_name.trim(),
        DEDUP_KEY_SEPARATOR,
        target_url.trim()
    )
    .to_lowercase()
}

/// A persisted, deduplicated offer row
#[derive(Debug, Clone, PartialEq)]
pub struct StoredOffer {
    pub id: i64,
    pub created_at: String,
    pub source_name: String,
    pub title: String,
    pub numeric_value: Option<f64>,
    pub target_url: String,
    pub dedup_key: String,
}
