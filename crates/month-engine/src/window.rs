//! Month selection and the instant window bounding one displayed month.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};

use crate::dates::month_ordinal;
use crate::error::{CalendarError, Result};

/// A validated calendar month.
///
/// Holds the first date of the month, so every derived date is known to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    /// Build a year-month, rejecting months outside 1..=12 and unrepresentable years.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or(CalendarError::InvalidMonth { year, month })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(self) -> i32 {
        self.first.year()
    }

    pub fn month(self) -> u32 {
        self.first.month()
    }

    pub fn first_date(self) -> NaiveDate {
        self.first
    }

    pub fn last_date(self) -> NaiveDate {
        (28..=31)
            .rev()
            .find_map(|day| self.first.with_day(day))
            .unwrap_or(self.first)
    }

    /// Number of days in the month (28..=31).
    pub fn last_day(self) -> u32 {
        self.last_date().day()
    }

    /// Date of `day` in this month, if the month has that many days.
    pub fn date_of(self, day: u32) -> Option<NaiveDate> {
        self.first.with_day(day)
    }

    pub fn ordinal(self) -> i64 {
        month_ordinal(self.first)
    }

    /// The following month; stays put at the end of the representable calendar.
    #[must_use]
    pub fn next(self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map_or(self, |first| Self { first })
    }

    /// The preceding month; stays put at the start of the representable calendar.
    #[must_use]
    pub fn prev(self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map_or(self, |first| Self { first })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Parses `YYYY-MM` (a single-digit month is accepted).
impl FromStr for YearMonth {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CalendarError::InvalidMonthSelector(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Inclusive instant bounds of one calendar month.
///
/// `start` is midnight of day 1 and `end` is 23:59:59 of the last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    month: YearMonth,
}

impl MonthWindow {
    pub fn for_month(month: YearMonth) -> Self {
        let start = month.first_date().and_time(NaiveTime::MIN);
        let end = month.last_date().and_time(NaiveTime::MIN) + Duration::seconds(86_399);
        Self { start, end, month }
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }

    pub fn first_date(&self) -> NaiveDate {
        self.month.first_date()
    }

    pub fn last_date(&self) -> NaiveDate {
        self.month.last_date()
    }

    pub fn last_day(&self) -> u32 {
        self.month.last_day()
    }

    pub fn date_of(&self, day: u32) -> Option<NaiveDate> {
        self.month.date_of(day)
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        YearMonth::of(date) == self.month
    }
}

impl From<YearMonth> for MonthWindow {
    fn from(month: YearMonth) -> Self {
        Self::for_month(month)
    }
}
