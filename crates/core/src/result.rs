// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Annotated per-day output.
//!
//! Every field here is recomputed from raw `DutyDayInput` records on each
//! call. Nothing in this module is meant to be persisted.

use crew_ftl_domain::{DutyDayInput, Hours};
use serde::{Deserialize, Serialize};

/// Trailing sums ending on and including the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingMetrics {
    /// Duty time over 7 days.
    pub duty_time_7d: Hours,
    /// Duty time over 28 days.
    pub duty_time_28d: Hours,
    /// Flight time over 3 days.
    pub flight_time_3d: Hours,
    /// Flight time over 7 days.
    pub flight_time_7d: Hours,
    /// Flight time over 28 days.
    pub flight_time_28d: Hours,
    /// Flight time over 90 days.
    pub flight_time_90d: Hours,
    /// Flight time over 365 days.
    pub flight_time_365d: Hours,
    /// Calendar days of records available to the longest window (max 365).
    pub coverage_days: u16,
}

/// Consolidated max FDP verdict.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FdpCheck {
    /// Set when the FDP exceeds max FDP and no extension covers it.
    pub violation: Option<String>,
    /// Whether an extension was used to cover the excess.
    pub extension_applied: bool,
}

/// Rest period before the day's duty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestCheck {
    /// Rest since the previous duty ended.
    pub rest_period: Hours,
    /// False when no earlier duty end exists in the supplied records.
    pub has_history: bool,
    /// Set when the rest is shorter than the minimum.
    pub rest_violation: Option<String>,
}

/// Circadian-low exposure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisruptiveCheck {
    /// Whether the FDP touches the disruptive window.
    pub is_disruptive: bool,
    /// Set when a disruptive FDP exceeds the reduced limit.
    pub disruptive_violation: Option<String>,
}

/// Standby limits.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandbyCheck {
    /// Set when standby (alone or with the following FDP) is too long.
    pub standby_violation: Option<String>,
}

/// Consecutive duty days and days-off requirements.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaysOffCheck {
    /// Set on the day a days-off requirement is first breached.
    pub violation: Option<String>,
}

/// Rolling-total limits.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeCheck {
    /// Set when any rolling total exceeds its limit.
    pub violation: Option<String>,
}

/// A data-consistency problem that does not stop the computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DayWarning {
    /// Flight time logged on a type the pilot is not rated on.
    UnratedAircraft {
        /// The aircraft type.
        aircraft: String,
    },
    /// Flight time logged without FDP start and end.
    FlightTimeWithoutFdp {
        /// The logged flight time.
        flight_duration: Hours,
    },
    /// FDP start equals FDP end although sectors were flown.
    ZeroLengthFdpWithSectors {
        /// The sector count.
        sectors: u32,
    },
    /// Only one side of a start/end pair was entered.
    HalfEnteredTimes {
        /// The pair (`duty`, `fdp`, `break`, `standby`).
        pair: String,
    },
    /// The split-duty break is longer than the FDP.
    BreakExceedsFdp {
        /// The break length.
        break_duration: Hours,
        /// The FDP span.
        fdp: Hours,
    },
}

impl std::fmt::Display for DayWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnratedAircraft { aircraft } => {
                write!(f, "Flight time logged on unrated aircraft '{aircraft}'")
            }
            Self::FlightTimeWithoutFdp { flight_duration } => {
                write!(f, "Flight time {flight_duration} logged without an FDP")
            }
            Self::ZeroLengthFdpWithSectors { sectors } => {
                write!(f, "Zero-length FDP with {sectors} sectors")
            }
            Self::HalfEnteredTimes { pair } => {
                write!(f, "Only one of the {pair} start and end times was entered")
            }
            Self::BreakExceedsFdp {
                break_duration,
                fdp,
            } => {
                write!(f, "Break {break_duration} is longer than the FDP {fdp}")
            }
        }
    }
}

/// One day of the target month with every computed annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyDayResult {
    /// The raw record, unchanged.
    #[serde(flatten)]
    pub input: DutyDayInput,
    /// Sum of flight hours (zero on a day off).
    pub flight_duration: Hours,
    /// FDP span less any split-duty break.
    pub actual_fdp: Hours,
    /// Max FDP from the rule table.
    pub max_fdp: Hours,
    /// `max(0, actual_fdp - max_fdp)`.
    pub fdp_extension: Hours,
    /// Split-duty break length.
    pub break_duration: Hours,
    /// Duty credit from contiguous standby.
    pub standby_credit: Hours,
    /// Max FDP verdict.
    pub fdp: FdpCheck,
    /// Rolling totals.
    pub metrics: RollingMetrics,
    /// Rest before this day's duty.
    pub rest: RestCheck,
    /// Circadian-low exposure.
    pub disruptive: DisruptiveCheck,
    /// Standby limits.
    pub standby: StandbyCheck,
    /// Days-off requirements.
    pub days_off_validation: DaysOffCheck,
    /// Rolling-total limits.
    pub cumulative: CumulativeCheck,
    /// Soft data-consistency warnings.
    pub warnings: Vec<DayWarning>,
}

impl DutyDayResult {
    /// All violation messages on this day, in a fixed order.
    #[must_use]
    pub fn violations(&self) -> Vec<&str> {
        [
            self.fdp.violation.as_deref(),
            self.rest.rest_violation.as_deref(),
            self.disruptive.disruptive_violation.as_deref(),
            self.standby.standby_violation.as_deref(),
            self.days_off_validation.violation.as_deref(),
            self.cumulative.violation.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Whether any rule is breached on this day.
    #[must_use]
    pub fn has_violation(&self) -> bool {
        !self.violations().is_empty()
    }

    /// Recovers the raw, persistable record.
    #[must_use]
    pub fn into_input(self) -> DutyDayInput {
        self.input
    }
}

/// Whether any day in `results` carries a violation.
#[must_use]
pub fn any_violation(results: &[DutyDayResult]) -> bool {
    results.iter().any(DutyDayResult::has_violation)
}
