//! Label policy -- what a day cell shows for one occurrence.
//!
//! Pure functions: the same span, day and config always produce the same
//! `Occurrence`.

use serde::{Deserialize, Serialize};

use crate::span::EventSpan;

/// How an occurrence is labelled, which also decides its place in the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelVariant {
    /// Any recurring event: glyph prefix, no time.
    RecurringCompact,
    /// Non-recurring event spanning several days, or all-day.
    MultiDayOrAllDay,
    /// Non-recurring single-day timed event: `HH:MM` prefix.
    Timed,
}

/// Where a label goes relative to the cell's existing entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Prepend,
    Append,
}

impl LabelVariant {
    pub fn classify(span: &EventSpan) -> Self {
        if span.is_recurring() {
            Self::RecurringCompact
        } else if span.day_span() > 0 || span.all_day {
            Self::MultiDayOrAllDay
        } else {
            Self::Timed
        }
    }

    /// Recurring and multi-day markers float to the top; timed events keep arrival order.
    pub fn placement(self) -> Placement {
        match self {
            Self::RecurringCompact | Self::MultiDayOrAllDay => Placement::Prepend,
            Self::Timed => Placement::Append,
        }
    }
}

/// Display settings for labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Titles longer than this many characters are cut.
    pub title_max_chars: usize,
    /// Appended to a cut title.
    pub ellipsis: String,
    /// Prefix for recurring events.
    pub recurrence_glyph: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            title_max_chars: 10,
            ellipsis: "...".to_string(),
            recurrence_glyph: "\u{21BB}".to_string(),
        }
    }
}

/// One rendered day of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub day: u32,
    pub variant: LabelVariant,
    pub display_text: String,
    pub tooltip_text: String,
}

/// Cut `title` to `config.title_max_chars` characters plus the ellipsis.
///
/// Counts Unicode scalar values, so multi-byte titles are never split mid-character.
pub fn truncate_title(title: &str, config: &LabelConfig) -> String {
    if title.chars().count() <= config.title_max_chars {
        return title.to_string();
    }
    let mut cut: String = title.chars().take(config.title_max_chars).collect();
    cut.push_str(&config.ellipsis);
    cut
}

/// Full detail text: date-time range, location and the untruncated title.
pub fn tooltip(span: &EventSpan) -> String {
    format!(
        "{} - {}\nLocation: {}\nTitle: {}",
        span.start.format("%Y/%m/%d %H:%M"),
        span.end.format("%Y/%m/%d %H:%M"),
        span.location,
        span.title
    )
}

/// Label `span` for the cell of `day`.
pub fn label(span: &EventSpan, day: u32, config: &LabelConfig) -> Occurrence {
    let variant = LabelVariant::classify(span);
    let title = truncate_title(&span.title, config);
    let display_text = match variant {
        LabelVariant::RecurringCompact => format!("{} {}", config.recurrence_glyph, title),
        LabelVariant::MultiDayOrAllDay => title,
        LabelVariant::Timed => format!("{} {}", span.start.format("%H:%M"), title),
    };
    Occurrence {
        day,
        variant,
        display_text,
        tooltip_text: tooltip(span),
    }
}
