// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{Date, Time};

/// Errors that can occur while parsing duty records or consulting a rule table.
///
/// Rule violations are never errors. These variants cover input that cannot be
/// evaluated at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A time-of-day string could not be parsed.
    MalformedTime {
        /// The day the field belongs to, if known.
        date: Option<Date>,
        /// The field name (e.g. `fdpStart`).
        field: &'static str,
        /// The raw value as supplied.
        value: String,
    },
    /// A sector count was negative.
    NegativeSectorCount {
        /// The day carrying the count.
        date: Date,
        /// The supplied value.
        sectors: i32,
    },
    /// Logged flight hours were negative or not a finite number.
    InvalidFlightHours {
        /// The day carrying the entry.
        date: Date,
        /// The aircraft type the hours were logged against.
        aircraft: String,
        /// The supplied value, formatted.
        value: String,
    },
    /// A duration value could not be interpreted as hours.
    InvalidHours(String),
    /// No rule-table band covers the requested lookup.
    RuleTableGap {
        /// The rule table version consulted.
        version: String,
        /// The report time of the lookup.
        report_time: Time,
        /// The sector count of the lookup.
        sectors: u32,
    },
    /// The rule table is internally inconsistent.
    InvalidRuleTable {
        /// The rule table version.
        version: String,
        /// Description of the inconsistency.
        reason: String,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedTime { date, field, value } => match date {
                Some(date) => write!(f, "Malformed time '{value}' in {field} on {date}"),
                None => write!(f, "Malformed time '{value}' in {field}"),
            },
            Self::NegativeSectorCount { date, sectors } => {
                write!(f, "Sector count on {date} must not be negative, got {sectors}")
            }
            Self::InvalidFlightHours {
                date,
                aircraft,
                value,
            } => {
                write!(
                    f,
                    "Invalid flight hours '{value}' for aircraft '{aircraft}' on {date}"
                )
            }
            Self::InvalidHours(msg) => write!(f, "Invalid hours: {msg}"),
            Self::RuleTableGap {
                version,
                report_time,
                sectors,
            } => {
                write!(
                    f,
                    "Rule table '{version}' has no max FDP for report time {:02}:{:02} with {sectors} sectors",
                    report_time.hour(),
                    report_time.minute()
                )
            }
            Self::InvalidRuleTable { version, reason } => {
                write!(f, "Invalid rule table '{version}': {reason}")
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
