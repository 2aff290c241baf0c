// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crew_ftl_domain::DomainError;
use time::Date;

/// Errors that abort a month recalculation.
///
/// A regulatory limit being exceeded is never one of these; violations are
/// reported on the affected day instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A day record or the rule table could not be evaluated.
    Domain(DomainError),
    /// No target-month days were supplied.
    EmptyMonth,
    /// The target days do not form exactly one calendar month.
    InvalidMonth {
        /// The first supplied date.
        first: Date,
        /// Why the range was rejected.
        reason: String,
    },
    /// A target day does not carry the date its position implies.
    DayOutOfSequence {
        /// The date expected at this position.
        expected: Date,
        /// The date found.
        found: Date,
    },
    /// The same historic date was supplied twice.
    DuplicateHistoricDay(Date),
    /// A historic record falls on or after the first day of the target month.
    HistoryOverlapsMonth {
        /// The offending historic date.
        date: Date,
        /// The first day of the target month.
        month_start: Date,
    },
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Domain(err) => write!(f, "Invalid duty data: {err}"),
            Self::EmptyMonth => write!(f, "No days supplied for the target month"),
            Self::InvalidMonth { first, reason } => {
                write!(f, "Target month starting {first} is invalid: {reason}")
            }
            Self::DayOutOfSequence { expected, found } => {
                write!(f, "Expected a record for {expected}, found {found}")
            }
            Self::DuplicateHistoricDay(date) => {
                write!(f, "Historic records contain {date} more than once")
            }
            Self::HistoryOverlapsMonth { date, month_start } => {
                write!(
                    f,
                    "Historic record {date} is not before the target month starting {month_start}"
                )
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DomainError> for EngineError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}
