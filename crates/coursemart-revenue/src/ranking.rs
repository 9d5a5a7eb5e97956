//! Ranking views.
//!
//! Each view groups completed sales or enrollments by entity (course,
//! student, instructor) rather than by period, sorts, and returns one page.
//! Ranks are global: `offset + index + 1`.
//!
//! These are informational views. They read whatever the store holds at the
//! moment and make no consistency promise across their sub-queries.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use coursemart_db::queries::{catalog, enrollments, orders, users};
use coursemart_types::order::UserRole;
use coursemart_types::ranking::{
    HotCourse, InstructorSortKey, Page, StudentSortKey, TopInstructor, TopRevenueCourse,
    TopStudent,
};
use rusqlite::Connection;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::aggregate::tally_by;
use crate::{Result, RevenueError};

/// Page size used when the caller gives none.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Largest page size accepted.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Page size bounds, overridable from configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: MAX_PAGE_LIMIT,
        }
    }
}

/// Validated 1-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<u32>, limit: Option<u32>, limits: PageLimits) -> Result<Self> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(limits.default_limit);
        if page == 0 {
            return Err(RevenueError::InvalidPagination("page starts at 1".into()));
        }
        if limit == 0 || limit > limits.max_limit {
            return Err(RevenueError::InvalidPagination(format!(
                "limit must be between 1 and {}",
                limits.max_limit
            )));
        }
        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Global rank of the `index`-th item on this page.
    pub fn rank(&self, index: usize) -> u64 {
        self.offset() + index as u64 + 1
    }

    /// Cut this page out of a fully sorted list.
    fn slice<T>(&self, sorted: Vec<T>) -> (Vec<(u64, T)>, u64) {
        let total = sorted.len() as u64;
        let items = sorted
            .into_iter()
            .skip(usize::try_from(self.offset()).unwrap_or(usize::MAX))
            .take(self.limit as usize)
            .enumerate()
            .map(|(i, item)| (self.rank(i), item))
            .collect();
        (items, total)
    }
}

pub fn parse_student_sort(raw: Option<&str>) -> Result<StudentSortKey> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("spent") | Some("total_spent") => Ok(StudentSortKey::Spent),
        Some("enrollments") | Some("enrollment_count") => Ok(StudentSortKey::Enrollments),
        Some(_) => Err(RevenueError::InvalidSortKey(raw.unwrap_or_default().to_string())),
    }
}

pub fn parse_instructor_sort(raw: Option<&str>) -> Result<InstructorSortKey> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("rating") => Ok(InstructorSortKey::Rating),
        Some("students") => Ok(InstructorSortKey::Students),
        Some("courses") => Ok(InstructorSortKey::Courses),
        Some(_) => Err(RevenueError::InvalidSortKey(raw.unwrap_or_default().to_string())),
    }
}

/// Courses by completed-enrollment count, with lifetime gross revenue.
pub fn hot_courses(conn: &Connection, pagination: Pagination) -> Result<Page<HotCourse>> {
    let rows = catalog::hot_course_rows(conn, pagination.limit, pagination.offset())?;
    let total = enrollments::count_enrolled_courses(conn)?;
    let revenue = tally_by(
        orders::list_completed_sales(conn)?,
        |sale| sale.course_id.clone(),
        |sale| sale.price,
    )?;

    let items = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| HotCourse {
            rank: pagination.rank(i),
            total_revenue: revenue
                .get(&row.course_id)
                .map_or(Decimal::ZERO, |t| t.sum),
            course_id: row.course_id,
            title: row.title,
            thumbnail_url: row.thumbnail_url,
            category_name: row.category_name,
            instructor_name: row.instructor_name,
            enrollment_count: row.enrollment_count,
        })
        .collect();

    Ok(Page::new(items, total, pagination.page, pagination.limit))
}

/// Students by spend over completed orders, or by completed enrollments.
pub fn top_students(
    conn: &Connection,
    pagination: Pagination,
    sort: StudentSortKey,
) -> Result<Page<TopStudent>> {
    let spent = tally_by(
        orders::list_completed_totals(conn)?,
        |(user_id, _)| user_id.clone(),
        |(_, total)| *total,
    )?;
    let enrolled: HashMap<String, u64> = enrollments::completed_counts_by_user(conn)?
        .into_iter()
        .collect();

    let mut students: Vec<TopStudent> = users::list_by_role(conn, UserRole::Student)?
        .into_iter()
        .map(|user| TopStudent {
            rank: 0,
            total_spent: spent.get(&user.id).map_or(Decimal::ZERO, |t| t.sum),
            enrollment_count: enrolled.get(&user.id).copied().unwrap_or(0),
            user_id: user.id,
            full_name: user.full_name,
            email: user.email,
            avatar_url: user.avatar_url,
        })
        .filter(|s| !s.total_spent.is_zero() || s.enrollment_count > 0)
        .collect();

    students.sort_by(|a, b| {
        let primary = match sort {
            StudentSortKey::Spent => b
                .total_spent
                .cmp(&a.total_spent)
                .then(b.enrollment_count.cmp(&a.enrollment_count)),
            StudentSortKey::Enrollments => b
                .enrollment_count
                .cmp(&a.enrollment_count)
                .then(b.total_spent.cmp(&a.total_spent)),
        };
        primary.then_with(|| a.user_id.cmp(&b.user_id))
    });

    let (ranked, total) = pagination.slice(students);
    let items = ranked
        .into_iter()
        .map(|(rank, student)| TopStudent { rank, ..student })
        .collect();
    Ok(Page::new(items, total, pagination.page, pagination.limit))
}

/// Independent instructors by average course rating, students or courses.
pub fn top_instructors(
    conn: &Connection,
    pagination: Pagination,
    sort: InstructorSortKey,
) -> Result<Page<TopInstructor>> {
    let students: HashMap<String, u64> = enrollments::distinct_students_by_creator(conn)?
        .into_iter()
        .collect();

    struct Acc {
        full_name: String,
        avatar_url: Option<String>,
        courses: BTreeSet<String>,
        ratings: Vec<Decimal>,
        categories: BTreeSet<String>,
    }

    let mut grouped: BTreeMap<String, Acc> = BTreeMap::new();
    for row in catalog::instructor_course_rows(conn)? {
        let acc = grouped.entry(row.instructor_id).or_insert_with(|| Acc {
            full_name: row.full_name,
            avatar_url: row.avatar_url,
            courses: BTreeSet::new(),
            ratings: Vec::new(),
            categories: BTreeSet::new(),
        });
        acc.courses.insert(row.course_id);
        if let Some(rating) = row.rating.and_then(Decimal::from_f64) {
            acc.ratings.push(rating);
        }
        if let Some(category) = row.category_name {
            acc.categories.insert(category);
        }
    }

    let mut instructors: Vec<TopInstructor> = grouped
        .into_iter()
        .map(|(user_id, acc)| TopInstructor {
            rank: 0,
            average_rating: average_rating(&acc.ratings),
            course_count: acc.courses.len() as u64,
            student_count: students.get(&user_id).copied().unwrap_or(0),
            categories: acc.categories.into_iter().collect(),
            user_id,
            full_name: acc.full_name,
            avatar_url: acc.avatar_url,
        })
        .collect();

    instructors.sort_by(|a, b| {
        let by_rating = || b.average_rating.cmp(&a.average_rating);
        let by_students = || b.student_count.cmp(&a.student_count);
        let by_courses = || b.course_count.cmp(&a.course_count);
        let primary: Ordering = match sort {
            InstructorSortKey::Rating => by_rating().then_with(by_students),
            InstructorSortKey::Students => by_students().then_with(by_rating),
            InstructorSortKey::Courses => by_courses().then_with(by_rating),
        };
        primary.then_with(|| a.user_id.cmp(&b.user_id))
    });

    let (ranked, total) = pagination.slice(instructors);
    let items = ranked
        .into_iter()
        .map(|(rank, instructor)| TopInstructor { rank, ..instructor })
        .collect();
    Ok(Page::new(items, total, pagination.page, pagination.limit))
}

/// Courses by lifetime gross revenue; courses that never sold are left out.
pub fn top_revenue_courses(
    conn: &Connection,
    pagination: Pagination,
) -> Result<Page<TopRevenueCourse>> {
    let revenue = tally_by(
        orders::list_completed_sales(conn)?,
        |sale| sale.course_id.clone(),
        |sale| sale.price,
    )?;

    let mut courses: Vec<TopRevenueCourse> = catalog::course_summaries(conn)?
        .into_iter()
        .filter_map(|course| {
            let tally = revenue.get(&course.course_id)?;
            (tally.sum > Decimal::ZERO).then(|| TopRevenueCourse {
                rank: 0,
                total_revenue: tally.sum,
                order_count: tally.count,
                course_id: course.course_id,
                title: course.title,
                thumbnail_url: course.thumbnail_url,
                instructor_name: course.instructor_name,
            })
        })
        .collect();

    courses.sort_by(|a, b| {
        b.total_revenue
            .cmp(&a.total_revenue)
            .then_with(|| a.course_id.cmp(&b.course_id))
    });

    let (ranked, total) = pagination.slice(courses);
    let items = ranked
        .into_iter()
        .map(|(rank, course)| TopRevenueCourse { rank, ..course })
        .collect();
    Ok(Page::new(items, total, pagination.page, pagination.limit))
}

/// Mean of rated courses, two decimal places; zero when nothing is rated.
fn average_rating(ratings: &[Decimal]) -> Decimal {
    if ratings.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = ratings.iter().sum();
    (sum / Decimal::from(ratings.len() as u64))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
