//! Recurrence descriptor parsing -- converts the list store's XML rule into a `RecurrenceRule`.
//!
//! A descriptor looks like:
//!
//! ```text
//! <recurrence><rule><firstDayOfWeek>su</firstDayOfWeek>
//!   <repeat><weekly mo="TRUE" we="TRUE" weekFrequency="1" /></repeat>
//!   <windowEnd>2024-12-31T09:00:00Z</windowEnd>
//! </rule></recurrence>
//! ```
//!
//! The descriptor is tokenized with `quick-xml` into elements with attributes and
//! text, then validated as a whole. A rule is only returned when every field it
//! needs is present and well formed.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Weekday};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::dates::parse_instant;

/// Reasons a descriptor cannot become a `RecurrenceRule`.
///
/// Callers skip the offending event; none of these abort a month render.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceParseError {
    /// A yearly rule without both `month=` and `day=`.
    #[error("yearly recurrence is missing its month or day")]
    MissingYearlyFields,

    /// Nth-weekday-of-month/year patterns (`monthlyByDay`, `yearlyByDay`).
    #[error("unsupported recurrence pattern: {0}")]
    UnsupportedPattern(String),

    #[error("malformed recurrence descriptor: {0}")]
    Malformed(String),

    #[error("invalid value {value:?} for {attribute}")]
    InvalidNumber { attribute: String, value: String },

    #[error("invalid windowEnd: {0}")]
    InvalidWindowEnd(String),
}

/// How a recurring series ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Termination {
    Forever,
    /// After this many occurrences.
    Instances(u32),
    /// On this instant, with the offset written in the descriptor.
    ///
    /// `EventSpan` turns it into a wall-clock date the same way it reads the
    /// event's own dates.
    WindowEnd(DateTime<FixedOffset>),
}

/// Repeat frequency. Yearly and monthly variants carry their anchor fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frequency {
    Yearly { month: u32, day: u32 },
    /// `day` is the anchor day of month; `None` means the event's own start day.
    Monthly { day: Option<u32> },
    Weekly,
    Daily,
    /// Every weekday, Monday through Friday.
    Weekday,
}

/// Set of active weekdays, one bit per day counted from Sunday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WeekdayMask(u8);

impl WeekdayMask {
    pub const EMPTY: Self = Self(0);
    /// Monday through Friday.
    pub const WORKWEEK: Self = Self(0b0011_1110);

    #[must_use]
    pub fn with(self, day: Weekday) -> Self {
        Self(self.0 | 1 << day.num_days_from_sunday())
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_sunday()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Active days in Sunday..Saturday order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        WEEKDAY_CODES
            .iter()
            .map(|&(_, day)| day)
            .filter(move |&day| self.contains(day))
    }
}

impl FromIterator<Weekday> for WeekdayMask {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl Serialize for WeekdayMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(|day| day.to_string()))
    }
}

/// A parsed recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurrenceRule {
    pub termination: Termination,
    pub frequency: Frequency,
    /// Step multiplier, always >= 1. Forced to 1 for `Weekday`.
    pub interval: u32,
    /// Active weekdays for `Weekly` and `Weekday`; empty otherwise.
    pub weekdays: WeekdayMask,
    /// First day of the weekly cycle used by interval stepping.
    pub first_day_of_week: Weekday,
}

impl RecurrenceRule {
    /// Parse a recurrence descriptor. See [`parse_recurrence`].
    pub fn parse(descriptor: &str) -> Result<Self, RecurrenceParseError> {
        parse_recurrence(descriptor)
    }

    /// Weekdays the series occupies when its first occurrence falls on `start`.
    ///
    /// A weekly rule with no day flags repeats on the start weekday.
    pub fn active_weekdays(&self, start: Weekday) -> WeekdayMask {
        match self.frequency {
            Frequency::Weekly if self.weekdays.is_empty() => WeekdayMask::EMPTY.with(start),
            _ => self.weekdays,
        }
    }

    /// The interval as a step size, never zero. Always 1 for `Weekday`.
    pub fn step(&self) -> u32 {
        match self.frequency {
            Frequency::Weekday => 1,
            _ => self.interval.max(1),
        }
    }
}

impl FromStr for RecurrenceRule {
    type Err = RecurrenceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_recurrence(s)
    }
}

const WEEKDAY_CODES: [(&str, Weekday); 7] = [
    ("su", Weekday::Sun),
    ("mo", Weekday::Mon),
    ("tu", Weekday::Tue),
    ("we", Weekday::Wed),
    ("th", Weekday::Thu),
    ("fr", Weekday::Fri),
    ("sa", Weekday::Sat),
];

const FREQUENCY_ELEMENTS: [&str; 4] = ["yearly", "monthly", "weekly", "daily"];

/// One element of the descriptor with its attributes and direct text.
#[derive(Debug, Default)]
struct Token {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
}

impl Token {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn flag(&self, name: &str) -> bool {
        self.attribute(name)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }

    /// The `dayFrequency`/`weekFrequency`/... interval attribute.
    fn interval_attribute(&self) -> Option<(&str, &str)> {
        self.attributes
            .iter()
            .find(|(key, _)| key.ends_with("Frequency"))
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

/// Parse a recurrence descriptor into a validated `RecurrenceRule`.
///
/// - Termination: `repeatInstances` wins over `windowEnd`; neither means forever.
/// - Frequency: the first `yearly`/`monthly`/`weekly`/`daily` element under
///   `repeat`. `daily weekday="TRUE"` selects [`Frequency::Weekday`]; no
///   frequency element at all selects [`Frequency::Daily`].
/// - Interval: the `*Frequency` attribute, default 1.
///
/// # Errors
/// - `UnsupportedPattern` for any `...ByDay` element, before anything else is read.
/// - `MissingYearlyFields` when a yearly rule lacks `month` or `day`.
/// - `Malformed`, `InvalidNumber`, `InvalidWindowEnd` for unreadable input.
pub fn parse_recurrence(descriptor: &str) -> Result<RecurrenceRule, RecurrenceParseError> {
    let tokens = tokenize(descriptor)?;

    if let Some(token) = tokens.iter().find(|t| t.name.ends_with("ByDay")) {
        return Err(RecurrenceParseError::UnsupportedPattern(token.name.clone()));
    }

    let termination = parse_termination(&tokens)?;
    let first_day_of_week = tokens
        .iter()
        .find(|t| t.name == "firstDayOfWeek")
        .and_then(|t| t.text.as_deref())
        .and_then(weekday_from_code)
        .unwrap_or(Weekday::Sun);

    let repeat = tokens
        .iter()
        .find(|t| FREQUENCY_ELEMENTS.contains(&t.name.as_str()));

    let (frequency, interval, weekdays) = match repeat {
        None => (Frequency::Daily, 1, WeekdayMask::EMPTY),
        Some(token) => parse_frequency(token)?,
    };

    Ok(RecurrenceRule {
        termination,
        frequency,
        interval,
        weekdays,
        first_day_of_week,
    })
}

fn parse_frequency(token: &Token) -> Result<(Frequency, u32, WeekdayMask), RecurrenceParseError> {
    let interval = match token.interval_attribute() {
        Some((name, value)) => positive(name, value)?,
        None => 1,
    };

    match token.name.as_str() {
        "yearly" => {
            let (Some(month), Some(day)) = (token.attribute("month"), token.attribute("day")) else {
                return Err(RecurrenceParseError::MissingYearlyFields);
            };
            let month = bounded("month", month, 12)?;
            let day = bounded("day", day, 31)?;
            Ok((Frequency::Yearly { month, day }, interval, WeekdayMask::EMPTY))
        }
        "monthly" => {
            let day = token
                .attribute("day")
                .map(|day| bounded("day", day, 31))
                .transpose()?;
            Ok((Frequency::Monthly { day }, interval, WeekdayMask::EMPTY))
        }
        "weekly" => {
            let mask: WeekdayMask = WEEKDAY_CODES
                .iter()
                .filter(|(code, _)| token.flag(code))
                .map(|&(_, day)| day)
                .collect();
            Ok((Frequency::Weekly, interval, mask))
        }
        _ if token.flag("weekday") => Ok((Frequency::Weekday, 1, WeekdayMask::WORKWEEK)),
        _ => Ok((Frequency::Daily, interval, WeekdayMask::EMPTY)),
    }
}

fn parse_termination(tokens: &[Token]) -> Result<Termination, RecurrenceParseError> {
    if let Some(count) = element_text(tokens, "repeatInstances") {
        return Ok(Termination::Instances(positive("repeatInstances", count)?));
    }
    if let Some(end) = element_text(tokens, "windowEnd") {
        return parse_instant(end)
            .map(Termination::WindowEnd)
            .ok_or_else(|| RecurrenceParseError::InvalidWindowEnd(end.to_string()));
    }
    Ok(Termination::Forever)
}

/// Text of the first element named `name`; an element with no text yields "".
fn element_text<'a>(tokens: &'a [Token], name: &str) -> Option<&'a str> {
    tokens
        .iter()
        .find(|t| t.name == name)
        .map(|t| t.text.as_deref().unwrap_or_default())
}

fn positive(attribute: &str, value: &str) -> Result<u32, RecurrenceParseError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(RecurrenceParseError::InvalidNumber {
            attribute: attribute.to_string(),
            value: value.to_string(),
        }),
    }
}

fn bounded(attribute: &str, value: &str, max: u32) -> Result<u32, RecurrenceParseError> {
    let n = positive(attribute, value)?;
    if n > max {
        return Err(RecurrenceParseError::InvalidNumber {
            attribute: attribute.to_string(),
            value: value.to_string(),
        });
    }
    Ok(n)
}

fn weekday_from_code(code: &str) -> Option<Weekday> {
    let code = code.trim();
    WEEKDAY_CODES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|&(_, day)| day)
}

/// Flatten the descriptor into element tokens in document order.
fn tokenize(descriptor: &str) -> Result<Vec<Token>, RecurrenceParseError> {
    let mut reader = Reader::from_str(descriptor);
    reader.config_mut().trim_text(true);

    let mut tokens: Vec<Token> = Vec::new();
    let mut open: Vec<usize> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                tokens.push(token_from(&e)?);
                open.push(tokens.len() - 1);
            }
            Ok(Event::Empty(e)) => tokens.push(token_from(&e)?),
            Ok(Event::End(_)) => {
                open.pop();
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| RecurrenceParseError::Malformed(err.to_string()))?;
                if let Some(token) = open.last().and_then(|&i| tokens.get_mut(i)) {
                    token.text = Some(text.into_owned());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(RecurrenceParseError::Malformed(err.to_string())),
        }
    }

    if tokens.is_empty() {
        return Err(RecurrenceParseError::Malformed(
            "descriptor contains no elements".to_string(),
        ));
    }
    Ok(tokens)
}

fn token_from(element: &BytesStart<'_>) -> Result<Token, RecurrenceParseError> {
    let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in element.attributes() {
        let attribute =
            attribute.map_err(|err| RecurrenceParseError::Malformed(err.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|err| RecurrenceParseError::Malformed(err.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Token {
        name,
        attributes,
        text: None,
    })
}
