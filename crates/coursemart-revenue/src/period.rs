//! Calendar bucketing.
//!
//! A [`Period`] is the bucket a timestamp falls into for a given
//! [`Granularity`], identified by a fixed-width key that sorts
//! chronologically as a plain string:
//!
//! | granularity | key          | bounds                              |
//! |-------------|--------------|-------------------------------------|
//! | day         | `YYYY-MM-DD` | that date                           |
//! | week        | `YYYY-WW`    | Monday..Sunday of the ISO-8601 week |
//! | month       | `YYYY-MM`    | first..last day of month            |
//! | year        | `YYYY`       | Jan 1..Dec 31                       |
//!
//! Week keys use the ISO week-numbering year, so Dec 29-31 can land in
//! week 1 of the next year and Jan 1-3 in week 52/53 of the previous one.
//! All calendar math is UTC.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Result, RevenueError};

/// Bucket size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl FromStr for Granularity {
    type Err = RevenueError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(RevenueError::InvalidGranularity(s.to_string())),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One calendar bucket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Period {
    pub granularity: Granularity,
    pub key: String,
    /// Inclusive.
    pub start: NaiveDate,
    /// Inclusive.
    pub end: NaiveDate,
}

impl Period {
    /// Bucket containing a Unix timestamp (seconds, UTC).
    pub fn of_timestamp(timestamp: i64, granularity: Granularity) -> Result<Self> {
        let date = DateTime::from_timestamp(timestamp, 0)
            .ok_or(RevenueError::InvalidTimestamp(timestamp))?
            .date_naive();
        Self::of_date(date, granularity)
    }

    /// Bucket containing a calendar date.
    pub fn of_date(date: NaiveDate, granularity: Granularity) -> Result<Self> {
        let key = match granularity {
            Granularity::Day => date.format("%Y-%m-%d").to_string(),
            Granularity::Week => {
                let iso = date.iso_week();
                format!("{:04}-{:02}", iso.year(), iso.week())
            }
            Granularity::Month => format!("{:04}-{:02}", date.year(), date.month()),
            Granularity::Year => format!("{:04}", date.year()),
        };
        Self::from_key(&key, granularity)
    }

    /// Rebuild a bucket from its canonical key.
    pub fn from_key(key: &str, granularity: Granularity) -> Result<Self> {
        let invalid = || RevenueError::InvalidPeriodKey {
            key: key.to_string(),
            granularity: granularity.as_str(),
        };

        let (start, end) = match granularity {
            Granularity::Day => {
                let [y, m, d] = split_fields::<3>(key).ok_or_else(invalid)?;
                let date = NaiveDate::from_ymd_opt(y, m as u32, d as u32).ok_or_else(invalid)?;
                (date, date)
            }
            Granularity::Week => {
                let [y, w] = split_fields::<2>(key).ok_or_else(invalid)?;
                let start = iso_week_start(y, w as u32).ok_or_else(invalid)?;
                let end = start.checked_add_days(Days::new(6)).ok_or_else(invalid)?;
                (start, end)
            }
            Granularity::Month => {
                let [y, m] = split_fields::<2>(key).ok_or_else(invalid)?;
                let start = NaiveDate::from_ymd_opt(y, m as u32, 1).ok_or_else(invalid)?;
                (start, last_day_of_month(start).ok_or_else(invalid)?)
            }
            Granularity::Year => {
                let [y] = split_fields::<1>(key).ok_or_else(invalid)?;
                let start = NaiveDate::from_ymd_opt(y, 1, 1).ok_or_else(invalid)?;
                let end = NaiveDate::from_ymd_opt(y, 12, 31).ok_or_else(invalid)?;
                (start, end)
            }
        };

        Ok(Self {
            granularity,
            key: key.to_string(),
            start,
            end,
        })
    }

    /// Calendar (or ISO week-numbering) year of the key.
    pub fn year(&self) -> i32 {
        match self.granularity {
            Granularity::Week => self.start.iso_week().year(),
            _ => self.start.year(),
        }
    }

    pub fn month(&self) -> Option<u32> {
        matches!(self.granularity, Granularity::Day | Granularity::Month)
            .then(|| self.start.month())
    }

    pub fn week(&self) -> Option<u32> {
        (self.granularity == Granularity::Week).then(|| self.start.iso_week().week())
    }

    pub fn day(&self) -> Option<u32> {
        (self.granularity == Granularity::Day).then(|| self.start.day())
    }
}

/// Monday of ISO week `week` of ISO year `year`.
///
/// Week 1 is the week holding the year's first Thursday, which is always the
/// week holding Jan 4. Its Monday may fall in the previous Gregorian year.
pub fn iso_week_start(year: i32, week: u32) -> Option<NaiveDate> {
    if week == 0 || week > iso_weeks_in_year(year)? {
        return None;
    }
    let jan4 = NaiveDate::from_ymd_opt(year, 1, 4)?;
    let week_one = jan4.checked_sub_days(Days::new(u64::from(
        jan4.weekday().num_days_from_monday(),
    )))?;
    week_one.checked_add_days(Days::new(u64::from(week - 1) * 7))
}

/// 52 or 53. Dec 28 always sits in the last ISO week of its year.
pub fn iso_weeks_in_year(year: i32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, 12, 28).map(|d| d.iso_week().week())
}

fn last_day_of_month(first: NaiveDate) -> Option<NaiveDate> {
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)?
    };
    next.pred_opt()
}

/// Split a zero-padded `YYYY[-NN[-NN]]` key into its numeric fields.
fn split_fields<const N: usize>(key: &str) -> Option<[i32; N]> {
    let mut out = [0i32; N];
    let mut parts = key.split('-');
    for (i, slot) in out.iter_mut().enumerate() {
        let part = parts.next()?;
        let width = if i == 0 { 4 } else { 2 };
        if part.len() != width || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

/// Optional inclusive calendar-date range of a report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Parse `YYYY-MM-DD` bounds, rejecting unparseable or reversed ranges.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let start = start.map(parse_date).transpose()?;
        let end = end.map(parse_date).transpose()?;
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(RevenueError::InvalidDateRange { start: s, end: e });
            }
        }
        Ok(Self { start, end })
    }

    /// First second covered, UTC.
    pub fn from_timestamp(&self) -> Option<i64> {
        self.start
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp())
    }

    /// Last second covered, UTC.
    pub fn to_timestamp(&self) -> Option<i64> {
        self.end
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map(|dt| dt.and_utc().timestamp())
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.from_timestamp().map_or(true, |from| timestamp >= from)
            && self.to_timestamp().map_or(true, |to| timestamp <= to)
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| RevenueError::InvalidDate(raw.to_string()))
}
