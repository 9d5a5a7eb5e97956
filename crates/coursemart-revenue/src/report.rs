//! Report assembly.
//!
//! A report is built from one read transaction: the attribution percentage
//! and the line items are read from the same snapshot, aggregated once, then
//! split and summarised. Nothing is written.

use coursemart_types::order::OrderLineItem;
use coursemart_types::report::{BucketDetail, ReportMode, RevenueBucket, RevenueReport};
use rusqlite::{Connection, TransactionBehavior};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::aggregate::{self, AggregateFilter, Aggregation};
use crate::attribution::{round_money, split_by_role, AttributionPercentage, Split};
use crate::growth::growth_rate;
use crate::period::{DateRange, Granularity, Period};
use crate::Result;

/// Raw report parameters as received from a caller.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReportRequest {
    /// `day`, `week`, `month` or `year`; month when absent.
    #[serde(default)]
    pub granularity: Option<String>,
    /// Scope the report to one creator's courses.
    #[serde(default)]
    pub creator_id: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl ReportRequest {
    /// Check every parameter and turn the request into an aggregation filter.
    pub fn validate(&self) -> Result<AggregateFilter> {
        let granularity = match self.granularity.as_deref() {
            Some(raw) => raw.parse()?,
            None => Granularity::default(),
        };
        let range = DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())?;
        let creator_id = self
            .creator_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        Ok(AggregateFilter {
            creator_id,
            range,
            granularity,
        })
    }
}

/// Build a revenue report against the store.
///
/// Fails with a validation error before touching the store, or with
/// [`RevenueError::Unavailable`](crate::RevenueError::Unavailable) if the
/// store cannot be read. Either way nothing is left behind.
pub fn build_report(conn: &mut Connection, request: &ReportRequest) -> Result<RevenueReport> {
    let filter = request.validate()?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
    let pct = AttributionPercentage::load(&tx)?;
    let items = aggregate::load_line_items(&tx, &filter)?;
    tx.commit()?;

    assemble(&items, pct, &filter)
}

/// Turn already-loaded line items into a report at a fixed percentage.
pub fn assemble(
    items: &[OrderLineItem],
    pct: AttributionPercentage,
    filter: &AggregateFilter,
) -> Result<RevenueReport> {
    let Aggregation { buckets, totals } = aggregate::aggregate(items, filter)?;
    let mode = if filter.creator_id.is_some() {
        ReportMode::Instructor
    } else {
        ReportMode::Platform
    };

    let buckets = buckets
        .into_iter()
        .map(|bucket| {
            let split = split_by_role(&bucket.sums, pct)?;
            Ok(RevenueBucket {
                period_key: bucket.period.key,
                period_start: bucket.period.start,
                period_end: bucket.period.end,
                gross_revenue: bucket.sums.gross,
                order_count: bucket.order_count,
                platform_share: split.platform_share,
                creator_share: split.creator_share,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let growth = growth_rate(&buckets)?;
    let details = buckets
        .iter()
        .map(|bucket| detail(bucket, mode, filter.granularity))
        .collect::<Result<Vec<_>>>()?;

    // Totals are split from the whole-range sums, not from the rounded
    // bucket shares.
    let split = split_by_role(&totals.sums, pct)?;
    let total_revenue = requester_share(split, mode);
    let average_revenue_per_course = if totals.course_count == 0 {
        Decimal::ZERO
    } else {
        round_money(total_revenue / Decimal::from(totals.course_count))
    };

    tracing::debug!(
        granularity = %filter.granularity,
        ?mode,
        buckets = details.len(),
        percentage = %pct,
        "revenue report assembled"
    );

    Ok(RevenueReport {
        mode,
        granularity: filter.granularity.as_str().to_string(),
        gross_revenue: totals.sums.gross,
        total_revenue,
        platform_share: split.platform_share,
        creator_share: split.creator_share,
        instructor_percentage: pct.instructor(),
        total_orders: totals.order_count,
        total_students: totals.student_count,
        total_courses: totals.course_count,
        average_revenue_per_course,
        growth_rate_percent: growth,
        start_date: filter.range.start,
        end_date: filter.range.end,
        details,
    })
}

fn requester_share(split: Split, mode: ReportMode) -> Decimal {
    match mode {
        ReportMode::Platform => split.platform_share,
        ReportMode::Instructor => split.creator_share,
    }
}

fn detail(bucket: &RevenueBucket, mode: ReportMode, granularity: Granularity) -> Result<BucketDetail> {
    let period = Period::from_key(&bucket.period_key, granularity)?;
    Ok(BucketDetail {
        period: bucket.period_key.clone(),
        year: Some(period.year()),
        month: period.month(),
        week: period.week(),
        day: period.day(),
        start_date: bucket.period_start,
        end_date: bucket.period_end,
        gross_revenue: bucket.gross_revenue,
        revenue: requester_share(
            Split {
                platform_share: bucket.platform_share,
                creator_share: bucket.creator_share,
            },
            mode,
        ),
        platform_share: bucket.platform_share,
        creator_share: bucket.creator_share,
        order_count: bucket.order_count,
    })
}
