//! # coursemart-db
//!
//! SQLite storage for users, the course catalog, orders, enrollments and
//! administrator settings.
//!
//! The daemon keeps one file, `coursemart.db`, in its data directory. Every
//! connection comes from [`open`] or [`open_memory`]; both apply
//! [`CONNECTION_PRAGMAS`] and bring the schema to [`SCHEMA_VERSION`] before
//! handing the connection out.
//!
//! Money is stored as decimal text and read back as `rust_decimal::Decimal`.
//! Timestamps are Unix seconds.

pub mod migrations;
pub mod queries;
pub mod schema;

use std::path::Path;

use rusqlite::Connection;

/// Schema version this build reads and writes.
pub const SCHEMA_VERSION: u32 = 1;

/// Applied to every connection. Readers and the writer share the file under
/// WAL; a busy writer is waited on for up to five seconds.
pub const CONNECTION_PRAGMAS: &str = "PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;
PRAGMA synchronous = NORMAL;";

/// Storage failures.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Error reported by SQLite itself, including busy and locked files.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The file's schema cannot be used by this build.
    #[error("migration failed: {0}")]
    Migration(String),

    /// A row addressed by id does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A write was rejected before reaching SQLite.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// A stored value could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Open the database file at `path`, creating it if needed.
pub fn open(path: &Path) -> Result<Connection> {
    prepare(Connection::open(path)?)
}

/// Open a private in-memory database with the full schema. Used by tests and
/// seed tooling.
pub fn open_memory() -> Result<Connection> {
    prepare(Connection::open_in_memory()?)
}

fn prepare(conn: Connection) -> Result<Connection> {
    conn.execute_batch(CONNECTION_PRAGMAS)?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// Parse a stored decimal string.
pub(crate) fn parse_decimal(raw: &str) -> Result<rust_decimal::Decimal> {
    raw.trim()
        .parse()
        .map_err(|e: rust_decimal::Error| DbError::Serialization(format!("decimal '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_memory() {
        let conn = open_memory().expect("open in-memory db");
        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .expect("get user_version");
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_connection_pragmas_applied() {
        let conn = open_memory().expect("open");
        let pragma = |name: &str| -> i64 {
            conn.pragma_query_value(None, name, |row| row.get(0))
                .expect("read pragma")
        };
        assert_eq!(pragma("foreign_keys"), 1);
        assert_eq!(pragma("busy_timeout"), 5000);
    }

    #[test]
    fn test_reopening_file_keeps_data() {
        let path = std::env::temp_dir().join(format!("coursemart-db-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);
        {
            let conn = open(&path).expect("create");
            queries::settings::set(&conn, "k", "v").expect("set");
        }
        let conn = open(&path).expect("reopen");
        let value = queries::settings::get_optional(&conn, "k").expect("get");
        assert_eq!(value.as_deref(), Some("v"));
        drop(conn);
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(
            parse_decimal(" 300000.50 ").expect("parse"),
            rust_decimal::Decimal::new(30_000_050, 2)
        );
        assert!(matches!(
            parse_decimal("12,5"),
            Err(DbError::Serialization(_))
        ));
    }
}
