// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Local-date and time-of-day arithmetic.
//!
//! Duty records carry wall-clock times without a date. A duty whose end is
//! earlier than its start is taken to finish on the following calendar day.
//!
//! ## Invariants
//!
//! - `span` never returns a negative duration
//! - Malformed time strings are reported, never treated as midnight

use crate::error::DomainError;
use crate::hours::Hours;
use time::{Date, Duration, Month, PrimitiveDateTime, Time};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Parses an `HH:MM` time of day.
///
/// One- or two-digit hours are accepted; minutes must have two digits.
///
/// # Errors
///
/// Returns `DomainError::MalformedTime` if the value is not a valid time of day.
pub fn parse_clock(value: &str, field: &'static str) -> Result<Time, DomainError> {
    let malformed = || DomainError::MalformedTime {
        date: None,
        field,
        value: value.to_string(),
    };

    let (hour, minute) = value.trim().split_once(':').ok_or_else(malformed)?;
    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
        return Err(malformed());
    }
    if !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let hour: u8 = hour.parse().map_err(|_| malformed())?;
    let minute: u8 = minute.parse().map_err(|_| malformed())?;
    Time::from_hms(hour, minute, 0).map_err(|_| malformed())
}

/// Formats a time of day as `HH:MM`.
#[must_use]
pub fn format_clock(time: Time) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Minutes elapsed since midnight.
#[must_use]
pub fn minute_of_day(time: Time) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// Duration from `start` to `end`, rolling past midnight when `end < start`.
///
/// Equal times yield zero.
#[must_use]
pub fn span(start: Time, end: Time) -> Hours {
    let diff: i64 = minute_of_day(end) - minute_of_day(start);
    if diff < 0 {
        Hours::from_minutes(diff + MINUTES_PER_DAY)
    } else {
        Hours::from_minutes(diff)
    }
}

/// Formats decimal hours as a clock-style duration, e.g. `12.5` → `12:30`.
///
/// # Errors
///
/// Returns an error if the value is negative or not finite.
pub fn decimal_to_clock(hours: f64) -> Result<String, DomainError> {
    Ok(Hours::from_decimal(hours)?.to_string())
}

/// Parses a clock-style duration into decimal hours, e.g. `12:30` → `12.5`.
///
/// # Errors
///
/// Returns an error if the value is not an `H:MM` duration.
pub fn clock_to_decimal(value: &str) -> Result<f64, DomainError> {
    Ok(Hours::parse_hhmm(value)?.as_decimal())
}

/// Combines a calendar date and a time of day.
#[must_use]
pub const fn at(date: Date, time: Time) -> PrimitiveDateTime {
    PrimitiveDateTime::new(date, time)
}

/// Absolute end of an interval that starts on `date` at `start` and ends at `end`.
///
/// # Errors
///
/// Returns an error if the end falls outside the supported date range.
pub fn interval_end(
    date: Date,
    start: Time,
    end: Time,
) -> Result<PrimitiveDateTime, DomainError> {
    at(date, start)
        .checked_add(span(start, end).to_duration())
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("resolving interval end on {date}"),
        })
}

/// Whole calendar days from `from` to `to` (negative if `to` is earlier).
#[must_use]
pub fn days_between(from: Date, to: Date) -> i64 {
    (to - from).whole_days()
}

/// Adds a signed number of calendar days.
///
/// # Errors
///
/// Returns an error if the result falls outside the supported date range.
pub fn add_days(date: Date, days: i64) -> Result<Date, DomainError> {
    date.checked_add(Duration::days(days))
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("adding {days} days to {date}"),
        })
}

/// First day of the month containing `date`.
///
/// # Errors
///
/// Returns an error only if the calendar date cannot be constructed.
pub fn first_of_month(date: Date) -> Result<Date, DomainError> {
    Date::from_calendar_date(date.year(), date.month(), 1).map_err(|e| {
        DomainError::DateArithmeticOverflow {
            operation: format!("finding the first of the month for {date}: {e}"),
        }
    })
}

/// Number of days in the given month.
///
/// # Errors
///
/// Returns an error if the month lies outside the supported date range.
pub fn month_days(year: i32, month: Month) -> Result<u8, DomainError> {
    let overflow = || DomainError::DateArithmeticOverflow {
        operation: format!("computing the length of {month} {year}"),
    };

    let next_first: Date = if month == Month::December {
        Date::from_calendar_date(year + 1, Month::January, 1)
    } else {
        Date::from_calendar_date(year, month.next(), 1)
    }
    .map_err(|_| overflow())?;

    next_first.previous_day().map(|d| d.day()).ok_or_else(overflow)
}

/// Serde adapter for `HH:MM` times of day, used by rule-table files.
pub mod hhmm {
    use super::{format_clock, parse_clock};
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Time;

    /// Serializes a time of day as `HH:MM`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(time: &Time, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_clock(*time))
    }

    /// Deserializes an `HH:MM` time of day.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid time of day.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Time, D::Error> {
        let raw: String = String::deserialize(deserializer)?;
        parse_clock(&raw, "rule table").map_err(serde::de::Error::custom)
    }
}
