//! Ranking views and the pagination envelope they share.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CourseId, UserId};

/// Paginated listing returned by every ranking query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    /// 1-based.
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Wrap a page of items, deriving `total_pages` from `total` and `limit`.
    pub fn new(items: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit))
        };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// Course ranked by enrollment volume.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HotCourse {
    /// Global 1-based position.
    pub rank: u64,
    pub course_id: CourseId,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub category_name: Option<String>,
    pub instructor_name: String,
    pub enrollment_count: u64,
    /// Lifetime gross revenue from completed orders.
    #[ts(type = "number")]
    pub total_revenue: Decimal,
}

/// Student ranked by spend or enrollment count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TopStudent {
    pub rank: u64,
    pub user_id: UserId,
    pub full_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    #[ts(type = "number")]
    pub total_spent: Decimal,
    pub enrollment_count: u64,
}

/// Independent instructor ranked by rating, students or courses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TopInstructor {
    pub rank: u64,
    pub user_id: UserId,
    pub full_name: String,
    pub avatar_url: Option<String>,
    /// Mean course rating, two decimal places.
    #[ts(type = "number")]
    pub average_rating: Decimal,
    pub course_count: u64,
    pub student_count: u64,
    /// Deduplicated, sorted.
    pub categories: Vec<String>,
}

/// Course ranked by lifetime gross revenue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TopRevenueCourse {
    pub rank: u64,
    pub course_id: CourseId,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub instructor_name: String,
    #[ts(type = "number")]
    pub total_revenue: Decimal,
    pub order_count: u64,
}

/// Sort key accepted by the top-students view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentSortKey {
    #[default]
    Spent,
    Enrollments,
}

/// Sort key accepted by the top-instructors view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructorSortKey {
    #[default]
    Rating,
    Students,
    Courses,
}
