//! Revenue aggregation.
//!
//! One pass over completed line items produces, per period bucket, the
//! gross revenue split by creator role (platform staff vs independent
//! instructor) plus distinct order counts, together with the same sums over
//! the whole filtered range. Attribution needs the role split because the
//! two creator classes are paid out at different rates.

use std::collections::{BTreeMap, BTreeSet};

use coursemart_db::queries::orders::{self, LineItemFilter};
use coursemart_types::order::{CreatorRole, OrderLineItem};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::period::{DateRange, Granularity, Period};
use crate::{Result, RevenueError};

/// Which line items to aggregate and how to bucket them.
#[derive(Clone, Debug, Default)]
pub struct AggregateFilter {
    /// Restrict to one course creator (instructor dashboard).
    pub creator_id: Option<String>,
    pub range: DateRange,
    pub granularity: Granularity,
}

impl AggregateFilter {
    fn admits(&self, item: &OrderLineItem) -> bool {
        self.creator_id
            .as_deref()
            .map_or(true, |id| item.creator_id == id)
            && self.range.contains(item.completed_at)
    }
}

/// Gross sums split by creator role.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoleSums {
    pub gross: Decimal,
    pub staff_gross: Decimal,
    pub instructor_gross: Decimal,
}

impl RoleSums {
    fn add(&mut self, role: CreatorRole, price: Decimal) -> Result<()> {
        add_money(&mut self.gross, price)?;
        match role {
            CreatorRole::PlatformStaff => add_money(&mut self.staff_gross, price),
            CreatorRole::IndependentInstructor => add_money(&mut self.instructor_gross, price),
        }
    }
}

/// `*acc += amount`, failing instead of overflowing.
fn add_money(acc: &mut Decimal, amount: Decimal) -> Result<()> {
    *acc = acc
        .checked_add(amount)
        .ok_or(RevenueError::AmountOverflow("summing revenue"))?;
    Ok(())
}

/// One non-empty period bucket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleBucket {
    pub period: Period,
    pub sums: RoleSums,
    /// Distinct orders with at least one item in this bucket.
    pub order_count: u64,
}

/// Whole-range figures produced by the same pass as the buckets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RangeTotals {
    pub sums: RoleSums,
    pub order_count: u64,
    /// Distinct buying users. Every completed purchase enrolls its buyer, so
    /// buyers stand in for the enrolled users of the scope.
    pub student_count: u64,
    /// Distinct courses sold.
    pub course_count: u64,
}

/// Output of [`aggregate`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Aggregation {
    /// Ascending by period key; only buckets with at least one order.
    pub buckets: Vec<RoleBucket>,
    pub totals: RangeTotals,
}

#[derive(Default)]
struct BucketAcc<'a> {
    sums: RoleSums,
    orders: BTreeSet<&'a str>,
}

/// Group line items into buckets.
///
/// Items outside `filter` are skipped even if the caller already filtered,
/// so the result only ever reflects the filter.
pub fn aggregate(items: &[OrderLineItem], filter: &AggregateFilter) -> Result<Aggregation> {
    let mut buckets: BTreeMap<String, (Period, BucketAcc<'_>)> = BTreeMap::new();
    let mut totals = RoleSums::default();
    let mut orders = BTreeSet::new();
    let mut students = BTreeSet::new();
    let mut courses = BTreeSet::new();

    for item in items.iter().filter(|item| filter.admits(item)) {
        let period = Period::of_timestamp(item.completed_at, filter.granularity)?;
        let (_, acc) = buckets
            .entry(period.key.clone())
            .or_insert_with(|| (period, BucketAcc::default()));
        acc.sums.add(item.creator_role, item.price)?;
        acc.orders.insert(item.order_id.as_str());

        totals.add(item.creator_role, item.price)?;
        orders.insert(item.order_id.as_str());
        students.insert(item.user_id.as_str());
        courses.insert(item.course_id.as_str());
    }

    let buckets = buckets
        .into_values()
        .map(|(period, acc)| RoleBucket {
            period,
            sums: acc.sums,
            order_count: acc.orders.len() as u64,
        })
        .collect();

    Ok(Aggregation {
        buckets,
        totals: RangeTotals {
            sums: totals,
            order_count: orders.len() as u64,
            student_count: students.len() as u64,
            course_count: courses.len() as u64,
        },
    })
}

/// Load the completed line items a filter selects.
pub fn load_line_items(conn: &Connection, filter: &AggregateFilter) -> Result<Vec<OrderLineItem>> {
    let items = orders::list_completed_line_items(
        conn,
        &LineItemFilter {
            creator_id: filter.creator_id.as_deref(),
            completed_from: filter.range.from_timestamp(),
            completed_to: filter.range.to_timestamp(),
        },
    )?;
    Ok(items)
}

/// Running sum and count for one group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub sum: Decimal,
    pub count: u64,
}

/// Group rows by key, summing an amount and counting rows.
///
/// Ranking views use this to group by course or user instead of by period.
pub fn tally_by<T, K, F, G>(
    rows: impl IntoIterator<Item = T>,
    key: F,
    amount: G,
) -> Result<BTreeMap<K, Tally>>
where
    K: Ord,
    F: Fn(&T) -> K,
    G: Fn(&T) -> Decimal,
{
    let mut groups: BTreeMap<K, Tally> = BTreeMap::new();
    for row in rows {
        let tally = groups.entry(key(&row)).or_default();
        add_money(&mut tally.sum, amount(&row))?;
        tally.count += 1;
    }
    Ok(groups)
}
