//! Start resolution -- the first day of a displayed month an event's series touches.
//!
//! Monthly, daily and weekly series are resolved in closed form from the number
//! of whole periods between the series start and the window. The only loop is
//! the bounded scan through one weekly cycle that straddles the month boundary.

use chrono::{Datelike, NaiveDate};
use tracing::trace;

use crate::dates::{add_days, cycle_start, cycles_between};
use crate::rule::{Frequency, RecurrenceRule};
use crate::span::EventSpan;
use crate::window::{MonthWindow, YearMonth};

/// Resolve the day-of-month where enumeration for `window` begins.
///
/// Returns `None` when the event has nothing to show in this month. That is a
/// normal outcome, not an error; the caller skips the event for this window.
pub fn resolve_start(span: &EventSpan, window: &MonthWindow) -> Option<u32> {
    if !span.touches(window) {
        return None;
    }

    let start = span.start.date();
    let day = match &span.rule {
        None => start.max(window.first_date()).day(),
        Some(rule) => resolve_recurring(rule, start, window)?,
    };

    trace!(title = %span.title, month = %window.month(), day, "resolved start day");
    Some(day)
}

fn resolve_recurring(rule: &RecurrenceRule, start: NaiveDate, window: &MonthWindow) -> Option<u32> {
    let month = window.month();
    let same_month = YearMonth::of(start) == month;

    match rule.frequency {
        Frequency::Yearly { month: m, day } => {
            (m == month.month() && day <= month.last_day()).then_some(day)
        }
        Frequency::Monthly { day } => {
            let anchor = day.unwrap_or(start.day());
            let elapsed = month.ordinal() - YearMonth::of(start).ordinal();
            let on_period = elapsed >= 0 && elapsed % i64::from(rule.step()) == 0;
            (on_period && anchor <= month.last_day()).then_some(anchor)
        }
        _ if same_month => Some(start.day()),
        Frequency::Daily => {
            let step = i64::from(rule.step());
            let gap = (window.first_date() - start).num_days();
            let periods = (gap + step - 1).div_euclid(step);
            let landing = add_days(start, periods * step)?;
            window.contains_date(landing).then(|| landing.day())
        }
        Frequency::Weekly | Frequency::Weekday => {
            let first_dow = rule.first_day_of_week;
            let step = i64::from(rule.step());
            let origin = cycle_start(start, first_dow)?;
            let cycles = cycles_between(origin, window.first_date(), first_dow)?;
            let active = (cycles + step - 1).div_euclid(step) * step;
            let cycle_first = add_days(origin, active * 7)?;
            first_date_in_month(cycle_first, window).map(|date| date.day())
        }
    }
}

/// Scan one weekly cycle forward for its first date inside the window.
///
/// The earliest active cycle can begin in the previous month and run into
/// the displayed one; the scan then lands on day 1. A cycle beginning after
/// the month yields `None`.
fn first_date_in_month(cycle_first: NaiveDate, window: &MonthWindow) -> Option<NaiveDate> {
    (0..7)
        .filter_map(|offset| add_days(cycle_first, offset))
        .find(|date| window.contains_date(*date))
}
