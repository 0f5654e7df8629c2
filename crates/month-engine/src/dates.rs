//! Immutable calendar arithmetic.
//!
//! Every helper takes a `NaiveDate` by value and returns a new one, so the
//! resolver and enumerator never share a mutable cursor.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, Weekday};
use chrono_tz::Tz;

/// Naive formats accepted when the payload carries no UTC offset.
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Months elapsed since year 0, used to compare and subtract year-months.
pub fn month_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

/// Number of days from `first` forward to `day` within one weekly cycle (0..=6).
pub fn days_into_cycle(day: Weekday, first: Weekday) -> i64 {
    let offset = (day.num_days_from_sunday() + 7 - first.num_days_from_sunday()) % 7;
    i64::from(offset)
}

/// First date of the weekly cycle containing `date`.
pub fn cycle_start(date: NaiveDate, first: Weekday) -> Option<NaiveDate> {
    add_days(date, -days_into_cycle(date.weekday(), first))
}

/// Whole weekly cycles between the cycles containing `from` and `to`.
pub fn cycles_between(from: NaiveDate, to: NaiveDate, first: Weekday) -> Option<i64> {
    let a = cycle_start(from, first)?;
    let b = cycle_start(to, first)?;
    Some((b - a).num_days().div_euclid(7))
}

/// Parse a datetime and keep the wall-clock time exactly as written.
///
/// An offset or `Z` suffix is dropped rather than applied; this is how all-day
/// items are read.
pub fn parse_wall_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    parse_naive(s)
}

/// Parse an instant, keeping the offset it was written with.
///
/// A value without an offset is taken to be UTC.
pub fn parse_instant(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Some(dt),
        Err(_) => Some(parse_naive(s)?.and_utc().fixed_offset()),
    }
}

/// Parse an instant and convert it to wall-clock time in `tz`.
///
/// A value without an offset is taken to be UTC.
pub fn parse_in_timezone(s: &str, tz: Tz) -> Option<NaiveDateTime> {
    Some(parse_instant(s)?.with_timezone(&tz).naive_local())
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cycle_start_sunday_first() {
        // 2024-03-13 is a Wednesday.
        assert_eq!(
            cycle_start(date(2024, 3, 13), Weekday::Sun),
            Some(date(2024, 3, 10))
        );
        assert_eq!(
            cycle_start(date(2024, 3, 10), Weekday::Sun),
            Some(date(2024, 3, 10))
        );
    }

    #[test]
    fn cycle_start_monday_first() {
        assert_eq!(
            cycle_start(date(2024, 3, 10), Weekday::Mon),
            Some(date(2024, 3, 4))
        );
    }

    #[test]
    fn cycles_between_counts_partial_weeks() {
        // Sat Mar 9 and Sun Mar 10 sit in adjacent Sunday-first cycles.
        assert_eq!(
            cycles_between(date(2024, 3, 9), date(2024, 3, 10), Weekday::Sun),
            Some(1)
        );
        assert_eq!(
            cycles_between(date(2024, 3, 10), date(2024, 3, 16), Weekday::Sun),
            Some(0)
        );
    }

    #[test]
    fn wall_time_ignores_offset() {
        let dt = parse_wall_time("2024-03-27T00:00:00Z").unwrap();
        assert_eq!(dt, date(2024, 3, 27).and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn timezone_conversion_moves_date() {
        let tokyo: Tz = "Asia/Tokyo".parse().unwrap();
        let dt = parse_in_timezone("2024-03-01T16:30:00Z", tokyo).unwrap();
        assert_eq!(dt, date(2024, 3, 2).and_hms_opt(1, 30, 0).unwrap());
    }

    #[test]
    fn instant_without_offset_is_utc() {
        let dt = parse_instant("2024-12-31T09:00:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);
        assert_eq!(dt.naive_utc(), date(2024, 12, 31).and_hms_opt(9, 0, 0).unwrap());
    }

    #[test]
    fn bare_date_is_midnight() {
        let dt = parse_wall_time("2024-12-31").unwrap();
        assert_eq!(dt, date(2024, 12, 31).and_hms_opt(0, 0, 0).unwrap());
    }
}
