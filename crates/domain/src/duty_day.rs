// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Raw and parsed per-day duty records, and the pilot profile.
//!
//! `DutyDayInput` is the shape the host persists: times are the raw strings
//! typed into the roster. `DutyDay` is the validated form the engine works
//! with. Parsing is the only place malformed input is rejected.

use crate::clock::{parse_clock, span};
use crate::error::DomainError;
use crate::hours::Hours;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use time::{Date, Time};

time::serde::format_description!(calendar_date, Date, "[year]-[month]-[day]");

/// One calendar day of raw roster entries for one pilot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyDayInput {
    /// The calendar day (unique key).
    #[serde(with = "calendar_date")]
    pub date: Date,
    /// Duty report time (`HH:MM`).
    #[serde(default)]
    pub duty_start: Option<String>,
    /// Duty release time (`HH:MM`).
    #[serde(default)]
    pub duty_end: Option<String>,
    /// Flight duty period start (`HH:MM`).
    #[serde(default)]
    pub fdp_start: Option<String>,
    /// Flight duty period end (`HH:MM`).
    #[serde(default)]
    pub fdp_end: Option<String>,
    /// Whether the FDP is split by a ground break.
    #[serde(default)]
    pub is_split_duty: bool,
    /// Break start (`HH:MM`), meaningful only for split duty.
    #[serde(default)]
    pub break_start: Option<String>,
    /// Break end (`HH:MM`), meaningful only for split duty.
    #[serde(default)]
    pub break_end: Option<String>,
    /// Decimal flight hours per aircraft type.
    #[serde(default)]
    pub flight_hours_by_aircraft: BTreeMap<String, f64>,
    /// Number of sectors flown.
    #[serde(default)]
    pub sectors: Option<i32>,
    /// Whether the day was flown with two pilots (or augmented).
    #[serde(default)]
    pub is_two_pilot_operation: bool,
    /// Standby start (`HH:MM`).
    #[serde(default)]
    pub standby_on: Option<String>,
    /// Standby end (`HH:MM`).
    #[serde(default)]
    pub standby_off: Option<String>,
    /// Whether the day is a day off.
    #[serde(default)]
    pub is_day_off: bool,
    /// Free text.
    #[serde(default)]
    pub remarks: String,
}

impl DutyDayInput {
    /// Creates an empty record for `date` (no duty, not a day off).
    #[must_use]
    pub const fn new(date: Date) -> Self {
        Self {
            date,
            duty_start: None,
            duty_end: None,
            fdp_start: None,
            fdp_end: None,
            is_split_duty: false,
            break_start: None,
            break_end: None,
            flight_hours_by_aircraft: BTreeMap::new(),
            sectors: None,
            is_two_pilot_operation: false,
            standby_on: None,
            standby_off: None,
            is_day_off: false,
            remarks: String::new(),
        }
    }

    /// Creates a day-off record for `date`.
    #[must_use]
    pub fn day_off(date: Date) -> Self {
        let mut input: Self = Self::new(date);
        input.is_day_off = true;
        input
    }
}

/// Crew complement used for max FDP lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CrewComplement {
    /// Single-pilot operation.
    SinglePilot,
    /// Two-pilot or augmented operation.
    TwoPilot,
}

impl std::fmt::Display for CrewComplement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SinglePilot => write!(f, "single-pilot"),
            Self::TwoPilot => write!(f, "two-pilot"),
        }
    }
}

/// The pilot's role on the flight deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CrewRole {
    /// Pilot in command.
    #[default]
    Captain,
    /// Second in command.
    FirstOfficer,
    /// Cruise relief pilot.
    SecondOfficer,
}

/// Read-only pilot context supplied by the host's staff directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PilotProfile {
    /// Aircraft types the pilot is rated on.
    pub aircraft_ratings: BTreeSet<String>,
    /// The pilot's crew role.
    pub crew_role: CrewRole,
}

impl PilotProfile {
    /// Creates a profile from a list of ratings.
    #[must_use]
    pub fn new<I, S>(ratings: I, crew_role: CrewRole) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            aircraft_ratings: ratings.into_iter().map(Into::into).collect(),
            crew_role,
        }
    }

    /// Returns whether the pilot holds a rating for `aircraft`.
    #[must_use]
    pub fn is_rated_on(&self, aircraft: &str) -> bool {
        self.aircraft_ratings.contains(aircraft)
    }
}

/// A pair of optional times-of-day as entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimePair {
    /// Start time, if entered.
    pub start: Option<Time>,
    /// End time, if entered.
    pub end: Option<Time>,
}

impl TimePair {
    /// Returns both ends when both were entered.
    #[must_use]
    pub const fn both(&self) -> Option<(Time, Time)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// Midnight-aware length, when both ends were entered.
    #[must_use]
    pub fn duration(&self) -> Option<Hours> {
        self.both().map(|(start, end)| span(start, end))
    }

    /// Whether exactly one side was entered.
    #[must_use]
    pub const fn is_half_entered(&self) -> bool {
        self.start.is_some() != self.end.is_some()
    }
}

/// A validated day record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DutyDay {
    /// The calendar day.
    pub date: Date,
    /// Duty period.
    pub duty: TimePair,
    /// Flight duty period.
    pub fdp: TimePair,
    /// Whether the FDP is split.
    pub is_split_duty: bool,
    /// Split-duty break.
    pub break_period: TimePair,
    /// Flight time per aircraft type.
    pub flight_hours: BTreeMap<String, Hours>,
    /// Sector count (absent is zero).
    pub sectors: u32,
    /// Whether a sector count was entered.
    pub sectors_entered: bool,
    /// Whether the day was flown with two pilots.
    pub is_two_pilot_operation: bool,
    /// Standby period.
    pub standby: TimePair,
    /// Whether the day is a day off.
    pub is_day_off: bool,
}

impl DutyDay {
    /// Parses and validates a raw day record.
    ///
    /// Duty, FDP, break and standby fields of a day off are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A time string is malformed
    /// - The sector count is negative
    /// - Any flight-hour entry is negative or not finite
    pub fn parse(input: &DutyDayInput) -> Result<Self, DomainError> {
        let date: Date = input.date;

        let mut flight_hours: BTreeMap<String, Hours> = BTreeMap::new();
        for (aircraft, value) in &input.flight_hours_by_aircraft {
            let hours: Hours =
                Hours::from_decimal(*value).map_err(|_| DomainError::InvalidFlightHours {
                    date,
                    aircraft: aircraft.clone(),
                    value: value.to_string(),
                })?;
            flight_hours.insert(aircraft.clone(), hours);
        }

        let sectors: u32 = match input.sectors {
            Some(n) => u32::try_from(n)
                .map_err(|_| DomainError::NegativeSectorCount { date, sectors: n })?,
            None => 0,
        };

        if input.is_day_off {
            return Ok(Self {
                date,
                duty: TimePair::default(),
                fdp: TimePair::default(),
                is_split_duty: false,
                break_period: TimePair::default(),
                flight_hours,
                sectors,
                sectors_entered: input.sectors.is_some(),
                is_two_pilot_operation: input.is_two_pilot_operation,
                standby: TimePair::default(),
                is_day_off: true,
            });
        }

        let field = |value: &Option<String>, name: &'static str| -> Result<Option<Time>, DomainError> {
            parse_optional_clock(value.as_deref(), name, date)
        };

        Ok(Self {
            date,
            duty: TimePair {
                start: field(&input.duty_start, "dutyStart")?,
                end: field(&input.duty_end, "dutyEnd")?,
            },
            fdp: TimePair {
                start: field(&input.fdp_start, "fdpStart")?,
                end: field(&input.fdp_end, "fdpEnd")?,
            },
            is_split_duty: input.is_split_duty,
            break_period: TimePair {
                start: field(&input.break_start, "breakStart")?,
                end: field(&input.break_end, "breakEnd")?,
            },
            flight_hours,
            sectors,
            sectors_entered: input.sectors.is_some(),
            is_two_pilot_operation: input.is_two_pilot_operation,
            standby: TimePair {
                start: field(&input.standby_on, "standbyOn")?,
                end: field(&input.standby_off, "standbyOff")?,
            },
            is_day_off: false,
        })
    }

    /// Sum of logged flight hours across aircraft types.
    #[must_use]
    pub fn flight_duration(&self) -> Hours {
        self.flight_hours.values().copied().sum()
    }

    /// Crew complement for max FDP lookups.
    #[must_use]
    pub const fn crew(&self) -> CrewComplement {
        if self.is_two_pilot_operation {
            CrewComplement::TwoPilot
        } else {
            CrewComplement::SinglePilot
        }
    }
}

/// Parses an optional, possibly blank, time field.
///
/// Blank strings count as not entered.
fn parse_optional_clock(
    value: Option<&str>,
    field: &'static str,
    date: Date,
) -> Result<Option<Time>, DomainError> {
    match value {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_clock(raw, field)
            .map(Some)
            .map_err(|_| DomainError::MalformedTime {
                date: Some(date),
                field,
                value: raw.to_string(),
            }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    fn make_input() -> DutyDayInput {
        let mut input: DutyDayInput = DutyDayInput::new(date!(2026 - 03 - 10));
        input.duty_start = Some("05:15".to_string());
        input.duty_end = Some("18:30".to_string());
        input.fdp_start = Some("05:15".to_string());
        input.fdp_end = Some("18:00".to_string());
        input.flight_hours_by_aircraft.insert("A320".to_string(), 3.5);
        input.flight_hours_by_aircraft.insert("A321".to_string(), 2.25);
        input.sectors = Some(3);
        input
    }

    #[test]
    fn test_parse_valid_day() {
        let day: DutyDay = DutyDay::parse(&make_input()).unwrap();
        assert_eq!(day.fdp.start, Some(time!(05:15)));
        assert_eq!(day.fdp.end, Some(time!(18:00)));
        assert_eq!(day.sectors, 3);
        assert!(day.sectors_entered);
        assert_eq!(day.flight_duration(), Hours::from_hm(5, 45));
        assert_eq!(day.fdp.duration(), Some(Hours::from_hm(12, 45)));
    }

    #[test]
    fn test_parse_blank_time_is_absent() {
        let mut input: DutyDayInput = make_input();
        input.standby_on = Some("  ".to_string());
        let day: DutyDay = DutyDay::parse(&input).unwrap();
        assert_eq!(day.standby.start, None);
    }

    #[test]
    fn test_parse_malformed_time_names_field_and_date() {
        let mut input: DutyDayInput = make_input();
        input.fdp_end = Some("25:00".to_string());
        let err: DomainError = DutyDay::parse(&input).unwrap_err();
        assert_eq!(
            err,
            DomainError::MalformedTime {
                date: Some(date!(2026 - 03 - 10)),
                field: "fdpEnd",
                value: "25:00".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_negative_sectors_is_error() {
        let mut input: DutyDayInput = make_input();
        input.sectors = Some(-1);
        let err: DomainError = DutyDay::parse(&input).unwrap_err();
        assert!(matches!(
            err,
            DomainError::NegativeSectorCount { sectors: -1, .. }
        ));
    }

    #[test]
    fn test_parse_negative_flight_hours_is_error() {
        let mut input: DutyDayInput = make_input();
        input
            .flight_hours_by_aircraft
            .insert("B738".to_string(), -2.0);
        let err: DomainError = DutyDay::parse(&input).unwrap_err();
        match err {
            DomainError::InvalidFlightHours { aircraft, .. } => assert_eq!(aircraft, "B738"),
            other => panic!("Expected InvalidFlightHours, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_day_off_ignores_duty_fields() {
        let mut input: DutyDayInput = DutyDayInput::day_off(date!(2026 - 03 - 11));
        input.fdp_start = Some("garbage".to_string());
        let day: DutyDay = DutyDay::parse(&input).unwrap();
        assert!(day.is_day_off);
        assert_eq!(day.fdp, TimePair::default());
    }

    #[test]
    fn test_time_pair_half_entered() {
        let pair: TimePair = TimePair {
            start: Some(time!(06:00)),
            end: None,
        };
        assert!(pair.is_half_entered());
        assert_eq!(pair.duration(), None);
    }

    #[test]
    fn test_pilot_profile_ratings() {
        let profile: PilotProfile = PilotProfile::new(["A320", "A321"], CrewRole::Captain);
        assert!(profile.is_rated_on("A320"));
        assert!(!profile.is_rated_on("B738"));
    }

    #[test]
    fn test_input_serde_uses_camel_case_and_iso_date() {
        let json: &str = r#"{
            "date": "2026-03-10",
            "fdpStart": "06:00",
            "fdpEnd": "18:00",
            "sectors": 2,
            "isTwoPilotOperation": true,
            "flightHoursByAircraft": {"A320": 4.5}
        }"#;
        let input: DutyDayInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.date, date!(2026 - 03 - 10));
        assert_eq!(input.fdp_start.as_deref(), Some("06:00"));
        assert!(input.is_two_pilot_operation);
        assert!(!input.is_day_off);

        let out: String = serde_json::to_string(&input).unwrap();
        assert!(out.contains("\"date\":\"2026-03-10\""));
        assert!(out.contains("\"flightHoursByAircraft\":{\"A320\":4.5}"));
    }
}
