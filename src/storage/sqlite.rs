//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::record::{Record, StoredOffer};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageResult};
use crate::storage::SaveOutcome;
use chrono::Utc;
use rusqlite::{ffi, params, Connection, ErrorCode};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// Missing parent directories are created.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// True for a UNIQUE constraint failure, i.e. a dedup key already stored
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl Storage for SqliteStorage {
    fn save(&mut self, records: &[Record]) -> StorageResult<SaveOutcome> {
        initialize_schema(&self.conn)?;

        // Dropping `tx` without commit rolls back
        let tx = self.conn.transaction()?;
        let mut outcome = SaveOutcome::default();
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO offers (created_at, source_name, title, numeric_value, target_url, dedup_key)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for record in records {
                let dedup_key = record.dedup_key();
                let result = stmt.execute(params![
                    Utc::now().to_rfc3339(),
                    record.source_name(),
                    record.title(),
                    record.numeric_value(),
                    record.target_url(),
                    dedup_key,
                ]);

                match result {
                    Ok(_) => outcome.inserted += 1,
                    Err(e) if is_unique_violation(&e) => {
                        tracing::debug!("Skipping already stored offer {}", dedup_key);
                        outcome.duplicates += 1;
                    }
                    Err(e) => {
                        tracing::error!("Insert of {} failed, rolling back batch: {}", dedup_key, e);
                        return Err(e.into());
                    }
                }
            }
        }
        tx.commit()?;

        Ok(outcome)
    }

    fn load_export_rows(&self) -> StorageResult<Vec<StoredOffer>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, created_at, source_name, title, numeric_value, target_url, dedup_key
             FROM offers
             ORDER BY numeric_value IS NULL, numeric_value ASC, id ASC",
        )?;

        let offers = stmt
            .query_map([], |row| {
                Ok(StoredOffer {
                    id: row.get(0)?,
                    created_at: row.get(1)?,
                    source_name: row.get(2)?,
                    title: row.get(3)?,
                    numeric_value: row.get(4)?,
                    target_url: row.get(5)?,
                    dedup_key: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(offers)
    }

    fn count_offers(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM offers", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_by_source(&self) -> StorageResult<Vec<(String, u64)>> {
        let query = "
            SELECT source_name, COUNT(*) as count
            FROM offers
            GROUP BY source_name
            ORDER BY count DESC, source_name ASC
        ";

        let mut stmt = self.conn.prepare(query)?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }

        Ok(counts)
    }

    fn value_range(&self) -> StorageResult<Option<(f64, f64)>> {
        let (min, max): (Option<f64>, Option<f64>) = self.conn.query_row(
            "SELECT MIN(numeric_value), MAX(numeric_value) FROM offers",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(min.zip(max))
    }
}
