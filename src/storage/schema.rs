//! Database schema definitions
//!
//! This module contains the SQL schema for the PriceFinder offer store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per distinct (source, target URL) pair
CREATE TABLE IF NOT EXISTS offers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    source_name TEXT NOT NULL,
    title TEXT NOT NULL,
    numeric_value REAL,
    target_url TEXT NOT NULL,
    dedup_key TEXT NOT NULL UNIQUE
);

CREATE INDEX IF NOT EXISTS idx_offers_numeric_value ON offers(numeric_value);
CREATE INDEX IF NOT EXISTS idx_offers_source_name ON offers(source_name);
"#;

/// Initializes the database schema
///
/// Safe to call on every open and before every save.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
