//! User query functions.

use coursemart_types::order::UserRole;
use rusqlite::types::Type;
use rusqlite::Connection;

use crate::Result;

/// Insert a user.
pub fn insert(
    conn: &Connection,
    id: &str,
    full_name: &str,
    email: &str,
    avatar_url: Option<&str>,
    role: UserRole,
    created_at: i64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO users (id, full_name, email, avatar_url, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![id, full_name, email, avatar_url, role.as_str(), created_at],
    )?;
    Ok(())
}

/// List every user holding `role`.
pub fn list_by_role(conn: &Connection, role: UserRole) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, full_name, email, avatar_url, role
         FROM users WHERE role = ?1 ORDER BY id",
    )?;

    let rows = stmt
        .query_map([role.as_str()], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                full_name: row.get(1)?,
                email: row.get(2)?,
                avatar_url: row.get(3)?,
                role: parse_role(row.get::<_, String>(4)?, 4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Map a stored role string, surfacing bad values as a column conversion failure.
pub(crate) fn parse_role(raw: String, column: usize) -> rusqlite::Result<UserRole> {
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

/// A raw user row.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub role: UserRole,
}
