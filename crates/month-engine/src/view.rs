//! The displayed list and month, passed explicitly into every render.

use chrono::NaiveDate;
use serde::Serialize;

use crate::window::{MonthWindow, YearMonth};

/// Which list is shown and for which month.
///
/// Navigation returns a new value; nothing is shared or mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarViewState {
    pub list_id: String,
    pub month: YearMonth,
}

impl CalendarViewState {
    pub fn new(list_id: impl Into<String>, month: YearMonth) -> Self {
        Self {
            list_id: list_id.into(),
            month,
        }
    }

    /// The view of the month containing `today`.
    pub fn current(list_id: impl Into<String>, today: NaiveDate) -> Self {
        Self::new(list_id, YearMonth::of(today))
    }

    pub fn window(&self) -> MonthWindow {
        MonthWindow::for_month(self.month)
    }

    #[must_use]
    pub fn next(&self) -> Self {
        Self::new(self.list_id.clone(), self.month.next())
    }

    #[must_use]
    pub fn prev(&self) -> Self {
        Self::new(self.list_id.clone(), self.month.prev())
    }

    /// Cell key of `day`: `{list}_{YYYY}-{MM}-{DD}`.
    pub fn cell_id(&self, day: u32) -> String {
        format!("{}_{}-{:02}", self.list_id, self.month, day)
    }
}
