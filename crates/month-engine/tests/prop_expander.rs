//! Property-based tests for month expansion using proptest.
//!
//! Every generated series is expanded for a generated month and compared
//! against a brute-force model that tests each date of the month on its own.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use month_engine::{
    occurrence_days, EventSpan, Frequency, MonthWindow, RecurrenceRule, Termination, WeekdayMask,
    YearMonth,
};
use proptest::prelude::*;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_frequency() -> impl Strategy<Value = Frequency> {
    prop_oneof![
        Just(Frequency::Daily),
        Just(Frequency::Weekly),
        Just(Frequency::Weekday),
        // Anchors stay within 1..=28 so every month has the day.
        prop::option::of(1u32..=28).prop_map(|day| Frequency::Monthly { day }),
    ]
}

fn arb_termination() -> impl Strategy<Value = Termination> {
    prop_oneof![
        Just(Termination::Forever),
        (1u32..=40).prop_map(Termination::Instances),
    ]
}

fn arb_rule() -> impl Strategy<Value = RecurrenceRule> {
    (
        arb_frequency(),
        1u32..=5,
        0u8..128,
        0usize..7,
        arb_termination(),
    )
        .prop_map(|(frequency, interval, bits, first, termination)| {
            let weekdays: WeekdayMask = match frequency {
                Frequency::Weekday => WeekdayMask::WORKWEEK,
                Frequency::Weekly => WEEKDAYS
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| bits & (1 << i) != 0)
                    .map(|(_, day)| *day)
                    .collect(),
                _ => WeekdayMask::EMPTY,
            };
            RecurrenceRule {
                termination,
                frequency,
                interval,
                weekdays,
                first_day_of_week: WEEKDAYS[first],
            }
        })
}

/// Series start in 2023-2025 and a series end up to ~14 months later.
fn arb_series() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (2023i32..=2025, 1u32..=12, 1u32..=31, 0i64..=420).prop_filter_map(
        "day must exist in month",
        |(y, m, d, len)| {
            let start = NaiveDate::from_ymd_opt(y, m, d)?;
            Some((start, start + Duration::days(len)))
        },
    )
}

/// Month offset from the series start's month; negative offsets show earlier months.
fn arb_month_offset() -> impl Strategy<Value = i32> {
    -2i32..=15
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

fn cycle_index(date: NaiveDate, origin: NaiveDate, first: Weekday) -> i64 {
    let cycle_of = |d: NaiveDate| {
        let into = (d.weekday().num_days_from_sunday() + 7 - first.num_days_from_sunday()) % 7;
        d - Duration::days(i64::from(into))
    };
    (cycle_of(date) - cycle_of(origin)).num_days() / 7
}

/// Whether `date` belongs to the unbounded series (ignoring its termination).
fn on_pattern(rule: &RecurrenceRule, start: NaiveDate, date: NaiveDate) -> bool {
    if date < start {
        return false;
    }
    let interval = i64::from(rule.interval);
    match rule.frequency {
        Frequency::Daily => (date - start).num_days() % interval == 0,
        Frequency::Weekday => !matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
        Frequency::Weekly => {
            let mask = if rule.weekdays.is_empty() {
                WeekdayMask::EMPTY.with(start.weekday())
            } else {
                rule.weekdays
            };
            mask.contains(date.weekday())
                && cycle_index(date, start, rule.first_day_of_week) % interval == 0
        }
        Frequency::Monthly { day } => {
            let months = (date.year() - start.year()) * 12 + date.month() as i32
                - start.month() as i32;
            date.day() == day.unwrap_or(start.day()) && i64::from(months) % interval == 0
        }
        Frequency::Yearly { .. } => unreachable!("yearly rules are not generated"),
    }
}

/// Every occurrence date of the series, found by walking each day from start to end.
fn model_dates(rule: &RecurrenceRule, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let limit = match rule.termination {
        Termination::Instances(count) => count as usize,
        _ => usize::MAX,
    };
    start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| on_pattern(rule, start, *date))
        .take(limit)
        .collect()
}

fn window_at(start: NaiveDate, offset: i32) -> MonthWindow {
    let mut month = YearMonth::of(start);
    for _ in 0..offset.unsigned_abs() {
        month = if offset < 0 { month.prev() } else { month.next() };
    }
    MonthWindow::for_month(month)
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 512,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property 1: expansion agrees with the brute-force model
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn expansion_matches_model(
        rule in arb_rule(),
        (start, end) in arb_series(),
        offset in arb_month_offset(),
    ) {
        let window = window_at(start, offset);
        let span = EventSpan::new(
            "p",
            start.and_hms_opt(9, 0, 0).unwrap(),
            end.and_hms_opt(10, 0, 0).unwrap(),
        )
        .with_rule(rule.clone());

        let expected: Vec<u32> = model_dates(&rule, start, end)
            .into_iter()
            .filter(|date| window.contains_date(*date))
            .map(|date| date.day())
            .collect();

        prop_assert_eq!(
            occurrence_days(&span, &window),
            expected,
            "rule {:?} from {} to {} in {}",
            rule,
            start,
            end,
            window.month()
        );
    }
}

// ---------------------------------------------------------------------------
// Property 2: output is ascending, unique and inside the month
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn days_are_sorted_unique_and_in_range(
        rule in arb_rule(),
        (start, end) in arb_series(),
        offset in arb_month_offset(),
    ) {
        let window = window_at(start, offset);
        let span = EventSpan::new(
            "p",
            start.and_hms_opt(9, 0, 0).unwrap(),
            end.and_hms_opt(10, 0, 0).unwrap(),
        )
        .with_rule(rule);

        let days = occurrence_days(&span, &window);
        for pair in days.windows(2) {
            prop_assert!(pair[0] < pair[1], "not strictly ascending: {:?}", days);
        }
        for day in &days {
            prop_assert!((1..=window.last_day()).contains(day), "day {} out of range", day);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 3: non-recurring spans cover exactly their clipped dates
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn single_spans_cover_their_dates(
        (start, _) in arb_series(),
        len in 0i64..=40,
        offset in -1i32..=2,
    ) {
        let end = start + Duration::days(len);
        let window = window_at(start, offset);
        let span = EventSpan::new(
            "p",
            start.and_hms_opt(0, 0, 0).unwrap(),
            end.and_hms_opt(23, 59, 0).unwrap(),
        )
        .all_day();

        let expected: Vec<u32> = start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter(|date| window.contains_date(*date))
            .map(|date| date.day())
            .collect();

        prop_assert_eq!(occurrence_days(&span, &window), expected);
    }
}
