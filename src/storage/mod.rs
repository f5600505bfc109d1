//! Storage module for persisting offers
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Deduplicated, append-only offer persistence
//! - Read queries for export and statistics

mod schema;
mod sqlite;
mod traits;

pub use schema::{initialize_schema, SCHEMA_SQL};
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Per-batch insert counts returned by [`Storage::save`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Rows newly written
    pub inserted: usize,
    /// Records skipped because their dedup key was already stored
    pub duplicates: usize,
}

impl SaveOutcome {
    pub fn attempted(&self) -> usize {
        self.inserted + self.duplicates
    }
}
