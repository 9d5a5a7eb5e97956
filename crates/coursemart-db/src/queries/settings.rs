//! Settings query functions.
//!
//! Settings are plain string key/value pairs edited by administrators.

use rusqlite::{Connection, OptionalExtension};

use crate::Result;

/// Get a setting value, or `None` when it has never been set.
pub fn get_optional(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM settings WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

/// Set a setting value.
pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
        rusqlite::params![key, value],
    )?;
    Ok(())
}

/// Store `value` only if `key` has no value yet. Returns whether a row was written.
pub fn insert_if_absent(conn: &Connection, key: &str, value: &str) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
        rusqlite::params![key, value],
    )?;
    Ok(inserted > 0)
}
