//! Month expansion -- resolve, enumerate and label one event for one window.

use tracing::debug;

use crate::enumerator::enumerate;
use crate::label::{label, LabelConfig, Occurrence};
use crate::resolver::resolve_start;
use crate::span::EventSpan;
use crate::window::MonthWindow;

/// Days of `window` occupied by `span`, ascending.
///
/// Empty when the event has no occurrence in the month.
pub fn occurrence_days(span: &EventSpan, window: &MonthWindow) -> Vec<u32> {
    match resolve_start(span, window) {
        Some(start_day) => enumerate(span, window, start_day),
        None => Vec::new(),
    }
}

/// Expand `span` into labelled occurrences for `window`.
pub fn expand_month(span: &EventSpan, window: &MonthWindow, config: &LabelConfig) -> Vec<Occurrence> {
    let days = occurrence_days(span, window);
    debug!(
        title = %span.title,
        month = %window.month(),
        count = days.len(),
        "expanded event"
    );
    days.into_iter()
        .map(|day| label(span, day, config))
        .collect()
}
