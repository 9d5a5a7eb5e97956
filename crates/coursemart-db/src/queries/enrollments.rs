//! Enrollment query functions.

use coursemart_types::order::EnrollmentStatus;
use rusqlite::Connection;

use crate::Result;

/// Insert an enrollment.
pub fn insert(
    conn: &Connection,
    user_id: &str,
    course_id: &str,
    status: EnrollmentStatus,
    enrolled_at: i64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO enrollments (user_id, course_id, status, enrolled_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![user_id, course_id, status.as_str(), enrolled_at],
    )?;
    Ok(())
}

/// Number of distinct courses with at least one completed enrollment.
pub fn count_enrolled_courses(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(DISTINCT course_id) FROM enrollments WHERE status = 'completed'",
        [],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

/// Completed enrollment count per user.
pub fn completed_counts_by_user(conn: &Connection) -> Result<Vec<(String, u64)>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, COUNT(*) FROM enrollments
         WHERE status = 'completed' GROUP BY user_id",
    )?;

    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? as u64)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Distinct enrolled students per course creator.
pub fn distinct_students_by_creator(conn: &Connection) -> Result<Vec<(String, u64)>> {
    let mut stmt = conn.prepare(
        "SELECT c.creator_id, COUNT(DISTINCT e.user_id)
         FROM enrollments e JOIN courses c ON c.id = e.course_id
         WHERE e.status = 'completed'
         GROUP BY c.creator_id",
    )?;

    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? as u64)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
