//! List items as returned by the calendar list's REST endpoint, and their
//! conversion into `EventSpan`s.
//!
//! All-day items carry local wall time with a misleading `Z` suffix, while timed
//! items carry real UTC instants. The conversion reads the former literally and
//! shifts the latter into the display timezone; a descriptor's `windowEnd`
//! follows its item.

use chrono_tz::Tz;
use serde::Deserialize;

use crate::dates::{parse_in_timezone, parse_wall_time};
use crate::error::{CalendarError, Result};
use crate::rule::parse_recurrence;
use crate::span::EventSpan;

/// One calendar list item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub event_date: String,
    pub end_date: String,
    #[serde(rename = "fAllDayEvent", default)]
    pub all_day: bool,
    #[serde(rename = "fRecurrence", default)]
    pub recurrence: bool,
    #[serde(default)]
    pub recurrence_data: Option<String>,
}

/// Item list payload: either `{"value": [...]}` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ItemsPayload {
    Wrapped { value: Vec<ListItem> },
    Bare(Vec<ListItem>),
}

/// Parse a list-items JSON payload.
pub fn parse_items(json: &str) -> Result<Vec<ListItem>> {
    let payload: ItemsPayload = serde_json::from_str(json)?;
    Ok(match payload {
        ItemsPayload::Wrapped { value } => value,
        ItemsPayload::Bare(items) => items,
    })
}

/// How item instants are turned into wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemOptions {
    /// Timezone timed items are displayed in.
    pub timezone: Tz,
}

impl Default for ItemOptions {
    fn default() -> Self {
        Self { timezone: Tz::UTC }
    }
}

impl ItemOptions {
    /// Options for an IANA timezone name such as `"Asia/Tokyo"`.
    pub fn with_timezone(name: &str) -> Result<Self> {
        let timezone = name
            .parse::<Tz>()
            .map_err(|_| CalendarError::InvalidTimezone(name.to_string()))?;
        Ok(Self { timezone })
    }
}

impl ListItem {
    /// Convert to an `EventSpan`, parsing the recurrence descriptor when flagged.
    ///
    /// # Errors
    /// `InvalidDateTime` for unreadable dates, `MissingRecurrenceData` for a
    /// recurring item without a descriptor, `Recurrence` when the descriptor is
    /// rejected (including unsupported nth-weekday patterns).
    pub fn to_span(&self, options: &ItemOptions) -> Result<EventSpan> {
        let read = |value: &str| {
            let parsed = if self.all_day {
                parse_wall_time(value)
            } else {
                parse_in_timezone(value, options.timezone)
            };
            parsed.ok_or_else(|| CalendarError::InvalidDateTime(value.to_string()))
        };

        let start = read(&self.event_date)?;
        let end = read(&self.end_date)?;

        let mut span = EventSpan::new(self.title.clone().unwrap_or_default(), start, end)
            .with_location(self.location.clone().unwrap_or_default());
        span.all_day = self.all_day;
        if !self.all_day {
            span = span.in_timezone(options.timezone);
        }

        if self.recurrence {
            let descriptor = self
                .recurrence_data
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .ok_or(CalendarError::MissingRecurrenceData)?;
            span = span.with_rule(parse_recurrence(descriptor)?);
        }
        Ok(span)
    }
}
