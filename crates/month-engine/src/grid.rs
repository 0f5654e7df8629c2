//! Month grid -- Sunday-first weeks of day cells that occurrences are placed into.
//!
//! Placement follows each occurrence's label variant: recurring and multi-day
//! labels are prepended to a cell, timed labels appended, so markers float to
//! the top while timed events keep the order they were placed in.

use std::collections::VecDeque;

use chrono::Datelike;
use serde::Serialize;
use tracing::{debug, warn};

use crate::expander::expand_month;
use crate::item::{ItemOptions, ListItem};
use crate::label::{LabelConfig, Occurrence, Placement};
use crate::span::EventSpan;
use crate::view::CalendarViewState;

const WEEKDAY_HEADERS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// One day of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub day: u32,
    /// Cell key, see [`CalendarViewState::cell_id`].
    pub id: String,
    pub entries: VecDeque<Occurrence>,
}

/// Outcome of populating a grid from list items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PopulateReport {
    /// Items converted and expanded (with or without occurrences this month).
    pub expanded: usize,
    /// Items skipped because they could not be converted.
    pub skipped: usize,
    /// Occurrences placed into cells.
    pub placed: usize,
}

/// A month laid out as weeks of seven slots; `None` pads before day 1 and after the last day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub view: CalendarViewState,
    pub weeks: Vec<Vec<Option<DayCell>>>,
}

impl MonthGrid {
    pub fn new(view: CalendarViewState) -> Self {
        let window = view.window();
        let lead = window.first_date().weekday().num_days_from_sunday() as usize;

        let mut slots: Vec<Option<DayCell>> = (0..lead).map(|_| None).collect();
        slots.extend((1..=window.last_day()).map(|day| {
            Some(DayCell {
                day,
                id: view.cell_id(day),
                entries: VecDeque::new(),
            })
        }));
        while slots.len() % 7 != 0 {
            slots.push(None);
        }

        let mut weeks = Vec::with_capacity(slots.len() / 7);
        let mut slots = slots.into_iter();
        loop {
            let week: Vec<Option<DayCell>> = slots.by_ref().take(7).collect();
            if week.is_empty() {
                break;
            }
            weeks.push(week);
        }

        Self { view, weeks }
    }

    pub fn cells(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flatten().flatten()
    }

    pub fn cell(&self, day: u32) -> Option<&DayCell> {
        self.cells().find(|cell| cell.day == day)
    }

    fn cell_mut(&mut self, day: u32) -> Option<&mut DayCell> {
        self.weeks
            .iter_mut()
            .flatten()
            .flatten()
            .find(|cell| cell.day == day)
    }

    /// Put one occurrence into its day cell. Returns `false` if the month has no such day.
    pub fn place(&mut self, occurrence: Occurrence) -> bool {
        let Some(cell) = self.cell_mut(occurrence.day) else {
            return false;
        };
        match occurrence.variant.placement() {
            Placement::Prepend => cell.entries.push_front(occurrence),
            Placement::Append => cell.entries.push_back(occurrence),
        }
        true
    }

    /// Expand one event for this grid's month and place every occurrence.
    pub fn add_span(&mut self, span: &EventSpan, config: &LabelConfig) -> usize {
        let window = self.view.window();
        expand_month(span, &window, config)
            .into_iter()
            .filter(|occurrence| {
                let placed = self.place(occurrence.clone());
                if !placed {
                    debug!(day = occurrence.day, "no cell for occurrence");
                }
                placed
            })
            .count()
    }

    /// Convert, expand and place every item, skipping the ones that fail.
    ///
    /// A bad item never stops the rest of the month from being populated.
    pub fn populate(
        &mut self,
        items: &[ListItem],
        options: &ItemOptions,
        config: &LabelConfig,
    ) -> PopulateReport {
        let mut report = PopulateReport::default();
        for item in items {
            match item.to_span(options) {
                Ok(span) => {
                    report.expanded += 1;
                    report.placed += self.add_span(&span, config);
                }
                Err(err) => {
                    warn!(
                        title = item.title.as_deref().unwrap_or_default(),
                        error = %err,
                        "skipping list item"
                    );
                    report.skipped += 1;
                }
            }
        }
        debug!(
            month = %self.view.month,
            expanded = report.expanded,
            skipped = report.skipped,
            placed = report.placed,
            "populated month grid"
        );
        report
    }

    /// Plain-text rendering with fixed-width columns.
    pub fn render_text(&self, column_width: usize) -> String {
        let width = column_width.max(4);
        let mut out = format!("{} {}\n", self.view.list_id, self.view.month);

        let header: Vec<String> = WEEKDAY_HEADERS
            .iter()
            .map(|name| fit(name, width))
            .collect();
        out.push_str(header.join(" ").trim_end());
        out.push('\n');

        for week in &self.weeks {
            let depth = week
                .iter()
                .flatten()
                .map(|cell| cell.entries.len())
                .max()
                .unwrap_or(0);

            let numbers: Vec<String> = week
                .iter()
                .map(|slot| match slot {
                    Some(cell) => fit(&cell.day.to_string(), width),
                    None => fit("", width),
                })
                .collect();
            out.push_str(numbers.join(" ").trim_end());
            out.push('\n');

            for row in 0..depth {
                let line: Vec<String> = week
                    .iter()
                    .map(|slot| {
                        let text = slot
                            .as_ref()
                            .and_then(|cell| cell.entries.get(row))
                            .map_or("", |entry| entry.display_text.as_str());
                        fit(text, width)
                    })
                    .collect();
                out.push_str(line.join(" ").trim_end());
                out.push('\n');
            }
        }
        out
    }
}

/// Pad or cut `text` to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let cut: String = text.chars().take(width).collect();
    format!("{cut:<width$}")
}
