//! Storage traits and error types
//!
//! This module defines the trait interface for offer stores and the
//! associated error types.

use crate::output::OutputError;
use crate::record::{Record, StoredOffer};
use crate::storage::SaveOutcome;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for offer store implementations
///
/// The store exclusively owns its rows. Rows are inserted once and never
/// updated or deleted.
pub trait Storage {
    /// Saves a batch of records in one transaction
    ///
    /// A record whose dedup key is already stored is skipped without error.
    /// Any other failure rolls back the whole batch.
    fn save(&mut self, records: &[Record]) -> StorageResult<SaveOutcome>;

    /// All stored offers, `numeric_value` ascending with missing values last
    fn load_export_rows(&self) -> StorageResult<Vec<StoredOffer>>;

    /// Total number of stored offers
    fn count_offers(&self) -> StorageResult<u64>;

    /// Offer counts per source, largest first
    fn count_by_source(&self) -> StorageResult<Vec<(String, u64)>>;

    /// Smallest and largest stored `numeric_value`, if any offer has one
    fn value_range(&self) -> StorageResult<Option<(f64, f64)>>;

    /// Writes every stored offer to a spreadsheet file
    ///
    /// Returns the number of rows written. Does not modify the store.
    fn export(&self, target: &Path) -> Result<usize, OutputError>
    where
        Self: Sized,
    {
        crate::output::export_offers(self, target)
    }
}
