//! Database schema for the SQLite content store

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Archived entries, one row per store key
CREATE TABLE IF NOT EXISTS artifacts (
    key TEXT PRIMARY KEY,
    content BLOB NOT NULL,
    content_type TEXT NOT NULL,
    created_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// Safe to call on an existing database.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
