//! Period arithmetic over calendar months.
//!
//! A period is a `(year, month)` pair written as `YYYY-MM`. Comparisons go
//! through [`YearMonth::ordinal`], `year * 12 + (month - 1)`, so ordering is
//! correct across year boundaries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, Utc};

use crate::{
    entities::recurring_template,
    errors::{Error, Result},
};

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    /// Builds a period from a year and a 1-based month.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| Error::InvalidYearMonth {
                value: format!("{year:04}-{month:02}"),
            })
    }

    /// The period containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    /// The period containing the UTC instant `at`.
    #[must_use]
    pub fn containing(at: DateTime<Utc>) -> Self {
        Self::from_date(at.date_naive())
    }

    /// Calendar year
    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Calendar month, 1-based
    #[must_use]
    pub fn month(self) -> u32 {
        self.0.month()
    }

    /// Single comparable integer for this period: `year * 12 + (month - 1)`.
    #[must_use]
    pub fn ordinal(self) -> i64 {
        i64::from(self.0.year()) * 12 + i64::from(self.0.month0())
    }

    /// First day of the month.
    #[must_use]
    pub const fn first_day(self) -> NaiveDate {
        self.0
    }

    /// The following month, `None` past the end of the supported calendar.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add_months(Months::new(1)).map(Self)
    }

    /// Number of days in the month.
    #[must_use]
    pub fn days_in_month(self) -> u32 {
        // Only December of chrono's last year has no successor.
        self.next()
            .and_then(|next| next.first_day().pred_opt())
            .map_or(31, |last| last.day())
    }

    /// The date for `day` within this month, clamped to the last valid day.
    #[must_use]
    pub fn day_clamped(self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days_in_month());
        self.0.with_day(day).unwrap_or(self.0)
    }

    /// Midnight UTC on the first day of the month (inclusive bound).
    #[must_use]
    pub fn start_utc(self) -> DateTime<Utc> {
        self.0.and_time(NaiveTime::MIN).and_utc()
    }

    /// Midnight UTC on the first day of the next month (exclusive bound).
    #[must_use]
    pub fn end_utc(self) -> DateTime<Utc> {
        self.next().map_or(DateTime::<Utc>::MAX_UTC, Self::start_utc)
    }

    /// Whether `at` falls inside this month (UTC).
    #[must_use]
    pub fn contains(self, at: DateTime<Utc>) -> bool {
        self.start_utc() <= at && at < self.end_utc()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidYearMonth {
            value: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;

        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if year.len() != 4 || !all_digits(year) || month.len() > 2 || !all_digits(month) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

/// Converts a `YYYY-MM` string to its ordinal.
pub fn to_ordinal(year_month: &str) -> Result<i64> {
    year_month.parse::<YearMonth>().map(YearMonth::ordinal)
}

/// Parses an optional validity bound. `None` and blank strings are unbounded.
pub fn parse_bound(bound: Option<&str>) -> Result<Option<YearMonth>> {
    match bound.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

/// Whether `period` lies within the inclusive `[start, end]` window, where a
/// missing side is unbounded.
#[must_use]
pub fn within(start: Option<YearMonth>, end: Option<YearMonth>, period: YearMonth) -> bool {
    let current = period.ordinal();
    start.is_none_or(|start| start.ordinal() <= current)
        && end.is_none_or(|end| current <= end.ordinal())
}

/// Whether `period` lies within the template's validity window.
///
/// A template whose `start_date` or `end_date` cannot be parsed is never in
/// period.
#[must_use]
pub fn in_period(template: &recurring_template::Model, period: YearMonth) -> bool {
    let start = parse_bound(template.start_date.as_deref());
    let end = parse_bound(template.end_date.as_deref());

    match (start, end) {
        (Ok(start), Ok(end)) => within(start, end, period),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(
                template_id = template.id,
                "Template '{}' has a malformed validity window: {}",
                template.template_name,
                e
            );
            false
        }
    }
}
