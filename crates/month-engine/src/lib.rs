//! # month-engine
//!
//! Recurrence expansion for month-grid calendars backed by a list store.
//!
//! Given an event's start/end, an optional recurrence descriptor and a
//! displayed month, the engine works out which days of that month host an
//! occurrence and how each one is labelled. Everything here is synchronous
//! and pure over immutable inputs.
//!
//! ## Modules
//!
//! - [`rule`]: recurrence descriptor → [`RecurrenceRule`]
//! - [`window`]: [`YearMonth`] and its [`MonthWindow`]
//! - [`resolver`]: first day a series touches in a month
//! - [`enumerator`]: every day a series occupies in a month
//! - [`label`]: label variant, truncated text and tooltip
//! - [`expander`]: the three steps above for one event
//! - [`grid`]: Sunday-first month grid and item population
//! - [`item`]: list item JSON → [`EventSpan`]
//! - [`view`]: explicit view state (list + month)
//! - [`error`]: Error types
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use month_engine::{occurrence_days, EventSpan, MonthWindow, RecurrenceRule, YearMonth};
//!
//! let rule: RecurrenceRule =
//!     r#"<recurrence><rule><repeat><monthly monthFrequency="2" day="10" /></repeat></rule></recurrence>"#
//!         .parse()
//!         .unwrap();
//! let start = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap().and_hms_opt(10, 0, 0).unwrap();
//! let span = EventSpan::new("Review", start, end).with_rule(rule);
//!
//! let march = MonthWindow::for_month(YearMonth::new(2024, 3).unwrap());
//! assert_eq!(occurrence_days(&span, &march), vec![10]);
//! ```

pub mod dates;
pub mod enumerator;
pub mod error;
pub mod expander;
pub mod grid;
pub mod item;
pub mod label;
pub mod resolver;
pub mod rule;
pub mod span;
pub mod tracing;
pub mod view;
pub mod window;

pub use enumerator::enumerate;
pub use error::CalendarError;
pub use expander::{expand_month, occurrence_days};
pub use grid::{DayCell, MonthGrid, PopulateReport};
pub use item::{parse_items, ItemOptions, ListItem};
pub use label::{label, truncate_title, LabelConfig, LabelVariant, Occurrence, Placement};
pub use resolver::resolve_start;
pub use rule::{
    parse_recurrence, Frequency, RecurrenceParseError, RecurrenceRule, Termination, WeekdayMask,
};
pub use span::EventSpan;
pub use view::CalendarViewState;
pub use window::{MonthWindow, YearMonth};
