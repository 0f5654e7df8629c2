//! Occurrence enumeration -- every day of a month an event occupies.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::rule::{Frequency, RecurrenceRule};
use crate::span::EventSpan;
use crate::window::MonthWindow;

/// Hard ceiling on day-of-month values.
const MAX_DAY: u32 = 31;

/// Walk forward from `start_day` and collect every day the event occupies in `window`.
///
/// - Non-recurring events cover `start_day..=start_day + day_span`.
/// - Daily series step by the interval.
/// - Weekly series step one day at a time and jump `(interval - 1) * 7 + 1` days
///   from the last day of a weekly cycle; days outside the weekday mask are
///   skipped but still consume their step.
/// - Monthly and yearly series occupy exactly one day per period.
///
/// Nothing is emitted past the month's last day, past the series end, or
/// before the series' own start date. The result is ascending and unique.
pub fn enumerate(span: &EventSpan, window: &MonthWindow, start_day: u32) -> Vec<u32> {
    let ceiling = last_emittable_day(span, window);
    let series_start = span.start.date();

    let mut days: Vec<u32> = match &span.rule {
        None => {
            let last = start_day.saturating_add(span.day_span()).min(ceiling);
            (start_day..=last).collect()
        }
        Some(rule) => match rule.frequency {
            Frequency::Yearly { .. } | Frequency::Monthly { .. } => {
                (start_day <= ceiling).then_some(start_day).into_iter().collect()
            }
            Frequency::Daily => (start_day..=ceiling)
                .step_by(rule.step() as usize)
                .collect(),
            Frequency::Weekly | Frequency::Weekday => {
                weekly_days(rule, series_start.weekday(), window, start_day, ceiling)
            }
        },
    };

    days.retain(|&day| window.date_of(day).is_some_and(|date| date >= series_start));
    days
}

fn weekly_days(
    rule: &RecurrenceRule,
    start_weekday: Weekday,
    window: &MonthWindow,
    start_day: u32,
    ceiling: u32,
) -> Vec<u32> {
    let mask = rule.active_weekdays(start_weekday);
    let cycle_last = rule.first_day_of_week.pred();
    let mut days = Vec::new();
    let mut day = start_day;

    while day <= ceiling {
        let Some(date) = window.date_of(day) else {
            break;
        };
        if mask.contains(date.weekday()) {
            days.push(day);
        }
        day = day.saturating_add(weekly_step(rule, date.weekday() == cycle_last));
    }
    days
}

/// Days to advance after visiting a candidate in a weekly series.
fn weekly_step(rule: &RecurrenceRule, at_cycle_end: bool) -> u32 {
    if rule.frequency == Frequency::Weekly && at_cycle_end && rule.step() > 1 {
        (rule.step() - 1).saturating_mul(7).saturating_add(1)
    } else {
        1
    }
}

/// Last day-of-month that may be emitted; 0 when the series ended before the window.
fn last_emittable_day(span: &EventSpan, window: &MonthWindow) -> u32 {
    let month_end = window.last_day().min(MAX_DAY);
    let series_end: NaiveDate = span.series_end();
    if series_end < window.first_date() {
        0
    } else if window.contains_date(series_end) {
        series_end.day().min(month_end)
    } else {
        month_end
    }
}
