//! Period-over-period growth.

use coursemart_types::report::RevenueBucket;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::{Result, RevenueError};

/// Percentage change of gross revenue from the second-last to the last bucket.
///
/// Rounded to one decimal place. Returns zero when there are fewer than two
/// buckets or the second-last bucket earned nothing.
pub fn growth_rate(buckets: &[RevenueBucket]) -> Result<Decimal> {
    let [.., previous, last] = buckets else {
        return Ok(Decimal::ZERO);
    };
    percent_change(previous.gross_revenue, last.gross_revenue)
}

/// `(current - previous) / previous * 100`, one decimal place, zero on a zero base.
pub fn percent_change(previous: Decimal, current: Decimal) -> Result<Decimal> {
    if previous.is_zero() {
        return Ok(Decimal::ZERO);
    }
    current
        .checked_sub(previous)
        .and_then(|delta| delta.checked_mul(dec!(100)))
        .and_then(|scaled| scaled.checked_div(previous))
        .map(|rate| rate.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
        .ok_or(RevenueError::AmountOverflow("computing growth"))
}
