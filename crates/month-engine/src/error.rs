//! Error types for month-engine operations.

use thiserror::Error;

use crate::rule::RecurrenceParseError;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Invalid month selector: {0}")]
    InvalidMonthSelector(String),

    #[error("Invalid datetime: {0}")]
    InvalidDateTime(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Recurring item has no recurrence data")]
    MissingRecurrenceData,

    #[error("Recurrence error: {0}")]
    Recurrence(#[from] RecurrenceParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CalendarError>;
