//! Course catalog query functions.

use rusqlite::Connection;

use crate::Result;

/// Insert a category.
pub fn insert_category(conn: &Connection, id: &str, name: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO categories (id, name) VALUES (?1, ?2)",
        rusqlite::params![id, name],
    )?;
    Ok(())
}

/// Insert a course.
#[allow(clippy::too_many_arguments)]
pub fn insert_course(
    conn: &Connection,
    id: &str,
    title: &str,
    thumbnail_url: Option<&str>,
    creator_id: &str,
    category_id: Option<&str>,
    rating: Option<f64>,
    created_at: i64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO courses (id, title, thumbnail_url, creator_id, category_id, rating, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![id, title, thumbnail_url, creator_id, category_id, rating, created_at],
    )?;
    Ok(())
}

/// Courses ordered by completed-enrollment count, one page at a time.
///
/// Ties are broken by course id so pages are stable.
pub fn hot_course_rows(conn: &Connection, limit: u32, offset: u64) -> Result<Vec<HotCourseRow>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.title, c.thumbnail_url, cat.name, u.full_name, COUNT(*) AS enrolled
         FROM enrollments e
         JOIN courses c ON c.id = e.course_id
         JOIN users u ON u.id = c.creator_id
         LEFT JOIN categories cat ON cat.id = c.category_id
         WHERE e.status = 'completed'
         GROUP BY c.id
         ORDER BY enrolled DESC, c.id ASC
         LIMIT ?1 OFFSET ?2",
    )?;

    let rows = stmt
        .query_map(rusqlite::params![limit, offset as i64], |row| {
            Ok(HotCourseRow {
                course_id: row.get(0)?,
                title: row.get(1)?,
                thumbnail_url: row.get(2)?,
                category_name: row.get(3)?,
                instructor_name: row.get(4)?,
                enrollment_count: row.get::<_, i64>(5)? as u64,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Title, thumbnail and creator name of every course.
pub fn course_summaries(conn: &Connection) -> Result<Vec<CourseSummaryRow>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.title, c.thumbnail_url, u.full_name
         FROM courses c JOIN users u ON u.id = c.creator_id
         ORDER BY c.id",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(CourseSummaryRow {
                course_id: row.get(0)?,
                title: row.get(1)?,
                thumbnail_url: row.get(2)?,
                instructor_name: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// One row per course owned by an independent instructor.
pub fn instructor_course_rows(conn: &Connection) -> Result<Vec<InstructorCourseRow>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.full_name, u.avatar_url, c.id, c.rating, cat.name
         FROM users u
         JOIN courses c ON c.creator_id = u.id
         LEFT JOIN categories cat ON cat.id = c.category_id
         WHERE u.role = 'instructor'
         ORDER BY u.id, c.id",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(InstructorCourseRow {
                instructor_id: row.get(0)?,
                full_name: row.get(1)?,
                avatar_url: row.get(2)?,
                course_id: row.get(3)?,
                rating: row.get(4)?,
                category_name: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// A course with its enrollment count.
#[derive(Debug, Clone)]
pub struct HotCourseRow {
    pub course_id: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub category_name: Option<String>,
    pub instructor_name: String,
    pub enrollment_count: u64,
}

/// Display fields of a course.
#[derive(Debug, Clone)]
pub struct CourseSummaryRow {
    pub course_id: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub instructor_name: String,
}

/// A course joined with its instructor.
#[derive(Debug, Clone)]
pub struct InstructorCourseRow {
    pub instructor_id: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub course_id: String,
    /// `None` until the course has been reviewed.
    pub rating: Option<f64>,
    pub category_name: Option<String>,
}
