//! Platform/creator revenue split.
//!
//! Independent instructors receive `p`% of the gross revenue of their own
//! courses and the platform keeps `100 - p`%. Courses owned by platform
//! staff are never split: the platform keeps all of it.
//!
//! `p` lives in the settings store under [`INSTRUCTOR_PERCENTAGE_KEY`] and can
//! be edited by an administrator at any time. A report therefore reads it
//! once into an [`AttributionPercentage`] and passes that snapshot to every
//! split it performs.
//!
//! Shares round half-up to whole currency units. Each share is rounded
//! separately, so for one scope `platform + creator` may differ from
//! `round(gross)` by at most one unit.

use std::fmt;

use coursemart_db::queries::settings;
use rusqlite::Connection;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::aggregate::RoleSums;
use crate::{Result, RevenueError};

/// Settings key holding the instructor percentage.
pub const INSTRUCTOR_PERCENTAGE_KEY: &str = "instructor_revenue_percentage";

/// Used when the setting is missing or unreadable.
pub const DEFAULT_INSTRUCTOR_PERCENTAGE: Decimal = dec!(70);

const HUNDRED: Decimal = dec!(100);

/// Immutable snapshot of the instructor share, always within `[0, 100]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributionPercentage(Decimal);

impl Default for AttributionPercentage {
    fn default() -> Self {
        Self(DEFAULT_INSTRUCTOR_PERCENTAGE)
    }
}

impl AttributionPercentage {
    /// Clamp `value` into `[0, 100]`.
    pub fn new(value: Decimal) -> Self {
        Self(value.clamp(Decimal::ZERO, HUNDRED))
    }

    /// Interpret a raw settings value.
    ///
    /// Missing or unparseable values fall back to the default; out-of-range
    /// values are clamped, since administrators edit this by hand.
    pub fn from_setting(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match raw.trim().parse::<Decimal>() {
            Ok(value) => {
                let pct = Self::new(value);
                if pct.0 != value {
                    tracing::warn!(%value, clamped = %pct.0, "instructor percentage out of range");
                }
                pct
            }
            Err(_) => {
                tracing::warn!(raw, "unparseable instructor percentage, using default");
                Self::default()
            }
        }
    }

    /// Read the current setting.
    pub fn load(conn: &Connection) -> Result<Self> {
        let raw = settings::get_optional(conn, INSTRUCTOR_PERCENTAGE_KEY)?;
        Ok(Self::from_setting(raw.as_deref()))
    }

    /// Instructor share, `p`.
    pub fn instructor(self) -> Decimal {
        self.0
    }

    /// Platform share of instructor-owned revenue, `100 - p`.
    pub fn platform(self) -> Decimal {
        HUNDRED - self.0
    }
}

impl fmt::Display for AttributionPercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

/// Validate an administrator-supplied percentage. Unlike reads, writes are strict.
pub fn parse_percentage(raw: &str) -> Result<Decimal> {
    let value: Decimal = raw
        .trim()
        .parse()
        .map_err(|_| RevenueError::InvalidPercentage(raw.to_string()))?;
    if value < Decimal::ZERO || value > HUNDRED {
        return Err(RevenueError::InvalidPercentage(raw.to_string()));
    }
    Ok(value.normalize())
}

/// Persist a new percentage. Reports already computed keep their snapshot.
pub fn store_percentage(conn: &Connection, value: Decimal) -> Result<AttributionPercentage> {
    let pct = AttributionPercentage::new(value);
    settings::set(conn, INSTRUCTOR_PERCENTAGE_KEY, &pct.instructor().to_string())?;
    tracing::info!(percentage = %pct, "instructor revenue percentage updated");
    Ok(pct)
}

/// Both sides of a split.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Split {
    pub platform_share: Decimal,
    pub creator_share: Decimal,
}

/// Round to whole currency units, half-up.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// `percent`% of `gross`, rounded.
///
/// The percentage is scaled to a fraction first so that the product never
/// exceeds `gross` itself.
fn share_of(gross: Decimal, percent: Decimal) -> Result<Decimal> {
    gross
        .checked_mul(percent / HUNDRED)
        .map(round_money)
        .ok_or(RevenueError::AmountOverflow("splitting revenue"))
}

/// Split revenue that belongs entirely to independent instructors.
pub fn split_instructor(gross: Decimal, pct: AttributionPercentage) -> Result<Split> {
    Ok(Split {
        platform_share: share_of(gross, pct.platform())?,
        creator_share: share_of(gross, pct.instructor())?,
    })
}

/// Split revenue of mixed ownership: staff-owned gross goes wholly to the
/// platform, instructor-owned gross is split at `pct`.
pub fn split_by_role(sums: &RoleSums, pct: AttributionPercentage) -> Result<Split> {
    let instructor = split_instructor(sums.instructor_gross, pct)?;
    let platform_share = instructor
        .platform_share
        .checked_add(round_money(sums.staff_gross))
        .ok_or(RevenueError::AmountOverflow("splitting revenue"))?;
    Ok(Split {
        platform_share,
        creator_share: instructor.creator_share,
    })
}
