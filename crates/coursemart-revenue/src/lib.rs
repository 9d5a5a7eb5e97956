//! # coursemart-revenue
//!
//! Revenue aggregation and attribution engine.
//!
//! Completed order line items are grouped into calendar buckets, split
//! between the platform and course creators, compared period over period,
//! and ranked.
//!
//! ## Modules
//!
//! - [`period`]: calendar bucketing (day / ISO week / month / year)
//! - [`aggregate`]: single-pass, role-discriminated revenue grouping
//! - [`attribution`]: platform/creator split at a snapshot percentage
//! - [`growth`]: period-over-period growth rate
//! - [`ranking`]: hot courses, top students, top instructors, top-earning courses
//! - [`report`]: assembles everything into a [`RevenueReport`]
//!
//! Money is [`rust_decimal::Decimal`] everywhere; shares round half-up to
//! whole currency units.
//!
//! [`RevenueReport`]: coursemart_types::report::RevenueReport

pub mod aggregate;
pub mod attribution;
pub mod growth;
pub mod period;
pub mod ranking;
pub mod report;

use chrono::NaiveDate;
use coursemart_db::DbError;

/// Error types for revenue operations.
#[derive(Debug, thiserror::Error)]
pub enum RevenueError {
    /// A date parameter is not a valid `YYYY-MM-DD` calendar date.
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Start date falls after end date.
    #[error("start date {start} is after end date {end}")]
    InvalidDateRange {
        /// Requested start.
        start: NaiveDate,
        /// Requested end.
        end: NaiveDate,
    },

    /// Unknown bucketing granularity.
    #[error("unknown granularity '{0}': expected day, week, month or year")]
    InvalidGranularity(String),

    /// A period key does not match its granularity's format.
    #[error("invalid {granularity} period key '{key}'")]
    InvalidPeriodKey {
        /// The offending key.
        key: String,
        /// Granularity the key was parsed as.
        granularity: &'static str,
    },

    /// Timestamp cannot be represented as a calendar date.
    #[error("timestamp {0} is outside the supported calendar range")]
    InvalidTimestamp(i64),

    /// Page or limit out of bounds.
    #[error("invalid pagination: {0}")]
    InvalidPagination(String),

    /// Sort key not supported by the requested ranking.
    #[error("unknown sort key '{0}'")]
    InvalidSortKey(String),

    /// Administrator supplied a percentage outside `[0, 100]`.
    #[error("percentage must be a number between 0 and 100, got '{0}'")]
    InvalidPercentage(String),

    /// A money sum or product left the representable decimal range.
    #[error("amount out of range while {0}")]
    AmountOverflow(&'static str),

    /// The underlying store failed; the request may be retried.
    #[error("revenue data temporarily unavailable: {0}")]
    Unavailable(#[from] DbError),
}

impl RevenueError {
    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<rusqlite::Error> for RevenueError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Unavailable(DbError::Sqlite(err))
    }
}

/// Convenience result type for revenue operations.
pub type Result<T> = std::result::Result<T, RevenueError>;
