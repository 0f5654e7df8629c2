//! The event value the engine expands, and where its series ends.

use chrono::{DateTime, Datelike, FixedOffset, Months, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;

use crate::dates::{add_days, cycle_start, cycles_between};
use crate::rule::{Frequency, RecurrenceRule, Termination};
use crate::window::MonthWindow;

/// One fetched event, normalised to wall-clock time.
///
/// For a recurring event `start` is the first instance and `end` is the end of
/// the whole series. `timezone` is the zone timed dates were converted into;
/// `None` means they were taken as written.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub all_day: bool,
    pub rule: Option<RecurrenceRule>,
    pub title: String,
    pub location: String,
    pub timezone: Option<Tz>,
}

impl EventSpan {
    pub fn new(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end,
            all_day: false,
            rule: None,
            title: title.into(),
            location: String::new(),
            timezone: None,
        }
    }

    #[must_use]
    pub fn all_day(mut self) -> Self {
        self.all_day = true;
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: RecurrenceRule) -> Self {
        self.rule = Some(rule);
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    #[must_use]
    pub fn in_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = Some(timezone);
        self
    }

    pub fn is_recurring(&self) -> bool {
        self.rule.is_some()
    }

    /// Whole days between the start and end calendar dates; 0 on the same date.
    pub fn day_span(&self) -> u32 {
        let days = (self.end.date() - self.start.date()).num_days();
        u32::try_from(days).unwrap_or(0)
    }

    /// Last date the event (or its series) may occupy.
    ///
    /// The earliest of the end date, a `windowEnd`, and the date of the last
    /// counted instance for `repeatInstances`.
    pub fn series_end(&self) -> NaiveDate {
        let end = self.end.date();
        let Some(rule) = &self.rule else {
            return end;
        };
        let limit = match rule.termination {
            Termination::Forever => None,
            Termination::WindowEnd(at) => Some(self.wall_date(at)),
            Termination::Instances(count) => last_instance(self.start.date(), end, rule, count),
        };
        limit.map_or(end, |limit| limit.min(end))
    }

    fn wall_date(&self, at: DateTime<FixedOffset>) -> NaiveDate {
        match self.timezone {
            Some(tz) => at.with_timezone(&tz).date_naive(),
            None => at.date_naive(),
        }
    }

    /// Whether the event or its series overlaps the window at all.
    pub fn touches(&self, window: &MonthWindow) -> bool {
        self.start.date() <= window.last_date() && self.series_end() >= window.first_date()
    }
}

/// Date of the `count`-th instance of a series starting on `start`.
///
/// Candidates past `end` are never examined. `None` when fewer than `count`
/// instances fall on or before `end`, or a date is out of range; the caller
/// then relies on `end` itself.
fn last_instance(
    start: NaiveDate,
    end: NaiveDate,
    rule: &RecurrenceRule,
    count: u32,
) -> Option<NaiveDate> {
    match rule.frequency {
        Frequency::Yearly { month, day } => {
            let years = (start.year()..=end.year())
                .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
                .take_while(|date| *date <= end);
            nth_on_or_after(years, start, count)
        }
        Frequency::Monthly { day } => {
            let anchor = day.unwrap_or(start.day());
            let first = start.with_day(1)?;
            let step = rule.step();
            let months = (0u32..)
                .map_while(|period| first.checked_add_months(Months::new(period.checked_mul(step)?)))
                .take_while(|month| *month <= end)
                .filter_map(|month| month.with_day(anchor))
                .take_while(|date| *date <= end);
            nth_on_or_after(months, start, count)
        }
        Frequency::Daily => {
            let skip = i64::from(count.saturating_sub(1));
            add_days(start, skip * i64::from(rule.step())).filter(|date| *date <= end)
        }
        Frequency::Weekly | Frequency::Weekday => {
            let mask = rule.active_weekdays(start.weekday());
            let origin = cycle_start(start, rule.first_day_of_week)?;
            let interval = i64::from(rule.step());
            let mut seen = 0;
            let mut date = start;
            while date <= end {
                let cycle = cycles_between(origin, date, rule.first_day_of_week)?;
                if cycle % interval == 0 && mask.contains(date.weekday()) {
                    seen += 1;
                    if seen >= count {
                        return Some(date);
                    }
                }
                date = date.succ_opt()?;
            }
            None
        }
    }
}

/// The `count`-th candidate date not before `start`.
///
/// Candidates whose anchor day is missing from their month or year have already
/// been dropped, so they are never counted.
fn nth_on_or_after(
    candidates: impl Iterator<Item = NaiveDate>,
    start: NaiveDate,
    count: u32,
) -> Option<NaiveDate> {
    let index = usize::try_from(count.checked_sub(1)?).ok()?;
    candidates.filter(|date| *date >= start).nth(index)
}
