//! Revenue report structures.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whose share a report's `totalRevenue` represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ReportMode {
    /// Aggregate across all creators; `totalRevenue` is the platform share.
    Platform,
    /// Single instructor's dashboard; `totalRevenue` is the creator share.
    Instructor,
}

/// One calendar bucket of aggregated revenue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueBucket {
    /// `YYYY-MM-DD`, `YYYY-WW`, `YYYY-MM` or `YYYY`.
    pub period_key: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub gross_revenue: Decimal,
    pub order_count: u64,
    pub platform_share: Decimal,
    pub creator_share: Decimal,
}

/// A bucket as rendered in a report's `details` list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BucketDetail {
    pub period: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    #[ts(type = "string")]
    pub start_date: NaiveDate,
    #[ts(type = "string")]
    pub end_date: NaiveDate,
    #[ts(type = "number")]
    pub gross_revenue: Decimal,
    /// Requester's share of this bucket.
    #[ts(type = "number")]
    pub revenue: Decimal,
    #[ts(type = "number")]
    pub platform_share: Decimal,
    #[ts(type = "number")]
    pub creator_share: Decimal,
    pub order_count: u64,
}

/// Final revenue report returned to dashboard consumers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RevenueReport {
    pub mode: ReportMode,
    /// `day` | `week` | `month` | `year`.
    pub granularity: String,
    #[ts(type = "number")]
    pub gross_revenue: Decimal,
    /// Requester's share: platform share in platform mode, creator share in instructor mode.
    #[ts(type = "number")]
    pub total_revenue: Decimal,
    #[ts(type = "number")]
    pub platform_share: Decimal,
    #[ts(type = "number")]
    pub creator_share: Decimal,
    /// Attribution percentage snapshot this report was computed with.
    #[ts(type = "number")]
    pub instructor_percentage: Decimal,
    pub total_orders: u64,
    pub total_students: u64,
    pub total_courses: u64,
    #[ts(type = "number")]
    pub average_revenue_per_course: Decimal,
    #[ts(type = "number")]
    pub growth_rate_percent: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub end_date: Option<NaiveDate>,
    pub details: Vec<BucketDetail>,
}
