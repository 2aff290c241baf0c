// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Exact duty-time durations.
//!
//! All duty arithmetic is carried out in whole minutes so that sums over a
//! 365-day window never drift. Decimal hours only appear at the boundary:
//! raw flight-hour entries coming in, serialized results going out.

use crate::error::DomainError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

const MINUTES_PER_HOUR: i64 = 60;

/// Largest duration accepted from input, so sums of limits never overflow.
const MAX_MINUTES: i64 = 1_000_000_000_000;

/// A duration measured in whole minutes.
///
/// Serialized as decimal hours (`12.5`). Deserialized from either decimal
/// hours or an `H:MM` string, which is how rule-table files spell limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hours {
    minutes: i64,
}

impl Hours {
    /// Zero duration.
    pub const ZERO: Self = Self { minutes: 0 };

    /// Creates a duration from whole minutes.
    #[must_use]
    pub const fn from_minutes(minutes: i64) -> Self {
        Self { minutes }
    }

    /// Creates a duration from hours and minutes.
    #[must_use]
    pub const fn from_hm(hours: i64, minutes: i64) -> Self {
        Self {
            minutes: hours * MINUTES_PER_HOUR + minutes,
        }
    }

    /// Creates a duration from decimal hours, rounded to the nearest minute.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is negative, not finite or out of range.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn from_decimal(hours: f64) -> Result<Self, DomainError> {
        if !hours.is_finite() || hours < 0.0 {
            return Err(DomainError::InvalidHours(format!(
                "{hours} is not a non-negative number of hours"
            )));
        }
        let minutes: f64 = (hours * 60.0).round();
        if minutes > MAX_MINUTES as f64 {
            return Err(DomainError::InvalidHours(format!("{hours} is out of range")));
        }
        Ok(Self {
            minutes: minutes as i64,
        })
    }

    /// Parses an `H:MM` duration such as `13:45` or `100:00`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `H:MM` with minutes below 60, or
    /// if the duration is out of range.
    pub fn parse_hhmm(value: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidHours(format!("'{value}' is not an H:MM duration"));

        let (hours, minutes) = value.trim().split_once(':').ok_or_else(invalid)?;
        if hours.is_empty() || minutes.len() != 2 {
            return Err(invalid());
        }
        let hours: i64 = hours.parse().map_err(|_| invalid())?;
        let minutes: i64 = minutes.parse().map_err(|_| invalid())?;
        if hours < 0 || !(0..60).contains(&minutes) {
            return Err(invalid());
        }
        Self::checked_hm(hours, minutes).ok_or_else(|| {
            DomainError::InvalidHours(format!("'{value}' is out of range"))
        })
    }

    /// Creates a duration from whole hours read from input.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is negative or out of range.
    pub fn from_whole_hours(hours: i64) -> Result<Self, DomainError> {
        if hours < 0 {
            return Err(DomainError::InvalidHours(format!("{hours} is negative")));
        }
        Self::checked_hm(hours, 0)
            .ok_or_else(|| DomainError::InvalidHours(format!("{hours} hours is out of range")))
    }

    fn checked_hm(hours: i64, minutes: i64) -> Option<Self> {
        hours
            .checked_mul(MINUTES_PER_HOUR)
            .and_then(|total| total.checked_add(minutes))
            .filter(|total| (0..=MAX_MINUTES).contains(total))
            .map(Self::from_minutes)
    }

    /// Returns the duration in whole minutes.
    #[must_use]
    pub const fn minutes(self) -> i64 {
        self.minutes
    }

    /// Returns the duration as decimal hours.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_decimal(self) -> f64 {
        self.minutes as f64 / 60.0
    }

    /// Returns whether the duration is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.minutes == 0
    }

    /// Subtraction clamped at zero.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        if self.minutes > other.minutes {
            Self {
                minutes: self.minutes - other.minutes,
            }
        } else {
            Self::ZERO
        }
    }

    /// Multiplies by `percent / 100`, rounding down to the minute.
    #[must_use]
    pub fn percent(self, percent: u32) -> Self {
        Self {
            minutes: self.minutes * i64::from(percent) / 100,
        }
    }

    /// Converts to a `time::Duration`.
    #[must_use]
    pub const fn to_duration(self) -> time::Duration {
        time::Duration::minutes(self.minutes)
    }

    /// Converts from a `time::Duration`, truncating seconds.
    #[must_use]
    pub const fn from_duration(duration: time::Duration) -> Self {
        Self {
            minutes: duration.whole_minutes(),
        }
    }
}

impl std::fmt::Display for Hours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign: &str = if self.minutes < 0 { "-" } else { "" };
        let abs: i64 = self.minutes.abs();
        write!(
            f,
            "{sign}{}:{:02}",
            abs / MINUTES_PER_HOUR,
            abs % MINUTES_PER_HOUR
        )
    }
}

impl Add for Hours {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            minutes: self.minutes + rhs.minutes,
        }
    }
}

impl AddAssign for Hours {
    fn add_assign(&mut self, rhs: Self) {
        self.minutes += rhs.minutes;
    }
}

impl Sub for Hours {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            minutes: self.minutes - rhs.minutes,
        }
    }
}

impl SubAssign for Hours {
    fn sub_assign(&mut self, rhs: Self) {
        self.minutes -= rhs.minutes;
    }
}

impl Sum for Hours {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Hours {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

struct HoursVisitor;

impl Visitor<'_> for HoursVisitor {
    type Value = Hours;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("decimal hours or an H:MM string")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Hours, E> {
        Hours::from_decimal(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Hours, E> {
        Hours::from_whole_hours(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Hours, E> {
        let hours: i64 = i64::try_from(v).map_err(E::custom)?;
        Hours::from_whole_hours(hours).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Hours, E> {
        Hours::parse_hhmm(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Hours {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(HoursVisitor)
    }
}
