// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-day FDP, standby and circadian-low calculations.
//!
//! Everything here depends on a single day plus the rule table and pilot
//! profile. Decisions that need earlier days (extension allowance, rest,
//! rolling totals) are made by the callers in `recalculate`.

use crate::result::{DayWarning, FdpCheck};
use crew_ftl_domain::clock::{minute_of_day, span};
use crew_ftl_domain::{
    DomainError, DutyDay, ExtensionContext, FdpQuery, Hours, PilotProfile, RuleTable, TimePair,
};
use time::Time;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Computed values for one day.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DayMetrics {
    /// Sum of flight hours.
    pub flight_duration: Hours,
    /// FDP span less any split-duty break.
    pub actual_fdp: Hours,
    /// Max FDP (zero when no FDP was flown).
    pub max_fdp: Hours,
    /// Amount by which the FDP exceeds max FDP.
    pub fdp_extension: Hours,
    /// Split-duty break length.
    pub break_duration: Hours,
    /// Standby length.
    pub standby_duration: Hours,
    /// Duty credit for standby leading into the FDP.
    pub standby_credit: Hours,
    /// Whether the FDP touches the disruptive window.
    pub is_disruptive: bool,
    /// Disruptive max FDP breach.
    pub disruptive_violation: Option<String>,
    /// Standby limit breach.
    pub standby_violation: Option<String>,
    /// Soft data warnings.
    pub warnings: Vec<DayWarning>,
}

impl DayMetrics {
    /// Duty time this day contributes to rolling duty totals.
    #[must_use]
    pub fn duty_contribution(&self) -> Hours {
        self.actual_fdp + self.standby_credit
    }
}

/// Calculates the per-day metrics for one parsed day.
///
/// # Arguments
///
/// * `day` - The validated day record
/// * `rules` - The rule table in force
/// * `profile` - The pilot's ratings, used only for soft warnings
///
/// # Returns
///
/// A `DayMetrics` value. A day off always yields all-zero metrics without
/// violations or warnings.
///
/// # Errors
///
/// Returns `DomainError::RuleTableGap` if the rule table has no max FDP for
/// the day's report time and sector count.
pub fn calculate_day_metrics(
    day: &DutyDay,
    rules: &RuleTable,
    profile: &PilotProfile,
) -> Result<DayMetrics, DomainError> {
    if day.is_day_off {
        return Ok(DayMetrics::default());
    }

    let mut metrics: DayMetrics = DayMetrics {
        flight_duration: day.flight_duration(),
        warnings: collect_entry_warnings(day, profile),
        ..DayMetrics::default()
    };

    if day.is_split_duty {
        metrics.break_duration = day.break_period.duration().unwrap_or(Hours::ZERO);
    }

    let standby: Option<(Time, Hours)> = day
        .standby
        .both()
        .map(|(on, off)| (on, span(on, off)));
    if let Some((_, duration)) = standby {
        metrics.standby_duration = duration;
    }

    let Some((fdp_start, fdp_end)) = day.fdp.both() else {
        if !metrics.flight_duration.is_zero() {
            metrics.warnings.push(DayWarning::FlightTimeWithoutFdp {
                flight_duration: metrics.flight_duration,
            });
        }
        if let Some((_, duration)) = standby {
            metrics.standby_violation = standby_limit_violation(duration, rules);
        }
        return Ok(metrics);
    };

    let fdp_span: Hours = span(fdp_start, fdp_end);
    if fdp_span.is_zero() && day.sectors > 0 {
        metrics.warnings.push(DayWarning::ZeroLengthFdpWithSectors {
            sectors: day.sectors,
        });
    }
    if metrics.break_duration > fdp_span {
        metrics.warnings.push(DayWarning::BreakExceedsFdp {
            break_duration: metrics.break_duration,
            fdp: fdp_span,
        });
    }
    metrics.actual_fdp = fdp_span.saturating_sub(metrics.break_duration);

    let query: FdpQuery = FdpQuery {
        report_time: fdp_start,
        sectors: day.sectors,
        crew: day.crew(),
        split_duty: day.is_split_duty,
        disruptive: false,
    };
    metrics.max_fdp = rules.max_fdp(&query)?;
    metrics.fdp_extension = metrics.actual_fdp.saturating_sub(metrics.max_fdp);

    metrics.is_disruptive = touches_window(fdp_start, fdp_span, rules.disruptive_window());
    if metrics.is_disruptive {
        let reduced: Hours = rules.max_fdp(&FdpQuery {
            disruptive: true,
            ..query
        })?;
        if metrics.actual_fdp > reduced {
            metrics.disruptive_violation = Some(format!(
                "Disruptive FDP {} exceeds the circadian-low limit {reduced}",
                metrics.actual_fdp
            ));
        }
    }

    if let Some((on, duration)) = standby {
        let lead: i64 = report_offset(on, fdp_start);
        let contiguous: bool =
            duration.minutes() + rules.standby.contiguity_tolerance.minutes() >= lead;

        if contiguous {
            metrics.standby_credit = rules.standby_credit(duration);
        }

        metrics.standby_violation = standby_limit_violation(duration, rules).or_else(|| {
            let awake: Hours = Hours::from_minutes(lead) + fdp_span;
            (contiguous && awake > rules.standby.max_standby_plus_fdp).then(|| {
                format!(
                    "Standby plus FDP {awake} exceeds the maximum {}",
                    rules.standby.max_standby_plus_fdp
                )
            })
        });
    }

    Ok(metrics)
}

/// Decides whether an FDP excess is covered by an extension.
///
/// `uses_in_lookback` is the number of extensions already granted in the
/// preceding `lookback_days - 1` calendar days.
#[must_use]
pub fn assess_fdp(
    day: &DutyDay,
    metrics: &DayMetrics,
    rules: &RuleTable,
    uses_in_lookback: u32,
) -> FdpCheck {
    if day.is_day_off || metrics.fdp_extension.is_zero() {
        return FdpCheck::default();
    }

    let context: ExtensionContext = ExtensionContext {
        excess: metrics.fdp_extension,
        sectors: day.sectors,
        disruptive: metrics.is_disruptive,
        uses_in_lookback,
    };

    if rules.extension_allowed(&context) {
        FdpCheck {
            violation: None,
            extension_applied: true,
        }
    } else {
        FdpCheck {
            violation: Some(format!(
                "FDP {} exceeds the maximum {} by {}",
                metrics.actual_fdp, metrics.max_fdp, metrics.fdp_extension
            )),
            extension_applied: false,
        }
    }
}

fn collect_entry_warnings(day: &DutyDay, profile: &PilotProfile) -> Vec<DayWarning> {
    let mut warnings: Vec<DayWarning> = day
        .flight_hours
        .keys()
        .filter(|aircraft| !profile.is_rated_on(aircraft))
        .map(|aircraft| DayWarning::UnratedAircraft {
            aircraft: aircraft.clone(),
        })
        .collect();

    let pairs: [(&TimePair, &str); 4] = [
        (&day.duty, "duty"),
        (&day.fdp, "fdp"),
        (&day.break_period, "break"),
        (&day.standby, "standby"),
    ];
    for (pair, name) in pairs {
        if pair.is_half_entered() {
            warnings.push(DayWarning::HalfEnteredTimes {
                pair: name.to_string(),
            });
        }
    }

    warnings
}

fn standby_limit_violation(duration: Hours, rules: &RuleTable) -> Option<String> {
    (duration > rules.standby.max_standby).then(|| {
        format!(
            "Standby {duration} exceeds the maximum {}",
            rules.standby.max_standby
        )
    })
}

/// Minutes from standby start to FDP report; a report earlier in the clock
/// than the standby start is taken to be on the following day.
fn report_offset(standby_on: Time, report: Time) -> i64 {
    let diff: i64 = minute_of_day(report) - minute_of_day(standby_on);
    if diff < 0 { diff + MINUTES_PER_DAY } else { diff }
}

/// Whether `[start, start + length)` intersects the daily window `(from, until)`.
///
/// The window is checked on the previous, same and following day so that
/// overnight FDPs and windows that wrap midnight are both handled.
fn touches_window(start: Time, length: Hours, window: (Time, Time)) -> bool {
    if length.is_zero() {
        return false;
    }

    let fdp_from: i64 = minute_of_day(start);
    let fdp_until: i64 = fdp_from + length.minutes();

    let window_from: i64 = minute_of_day(window.0);
    let window_length: i64 = span(window.0, window.1).minutes();

    (-1..=1).any(|day: i64| {
        let from: i64 = window_from + day * MINUTES_PER_DAY;
        let until: i64 = from + window_length;
        fdp_from < until && from < fdp_until
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crew_ftl_domain::{CrewRole, DutyDayInput};
    use time::macros::{date, time};

    fn profile() -> PilotProfile {
        PilotProfile::new(["A320"], CrewRole::Captain)
    }

    fn duty(fdp_start: &str, fdp_end: &str, sectors: i32) -> DutyDayInput {
        let mut input: DutyDayInput = DutyDayInput::new(date!(2026 - 03 - 10));
        input.duty_start = Some(fdp_start.to_string());
        input.duty_end = Some(fdp_end.to_string());
        input.fdp_start = Some(fdp_start.to_string());
        input.fdp_end = Some(fdp_end.to_string());
        input.sectors = Some(sectors);
        input.is_two_pilot_operation = true;
        input
            .flight_hours_by_aircraft
            .insert("A320".to_string(), 4.0);
        input
    }

    fn metrics_for(input: &DutyDayInput, rules: &RuleTable) -> DayMetrics {
        let day: DutyDay = DutyDay::parse(input).unwrap();
        calculate_day_metrics(&day, rules, &profile()).unwrap()
    }

    #[test]
    fn test_day_off_is_all_zero() {
        let mut input: DutyDayInput = duty("06:00", "20:00", 2);
        input.is_day_off = true;
        let metrics: DayMetrics = metrics_for(&input, &RuleTable::default());
        assert_eq!(metrics, DayMetrics::default());
    }

    #[test]
    fn test_actual_and_max_fdp() {
        let metrics: DayMetrics = metrics_for(&duty("06:00", "18:00", 2), &RuleTable::default());
        assert_eq!(metrics.actual_fdp, Hours::from_hm(12, 0));
        assert_eq!(metrics.max_fdp, Hours::from_hm(13, 0));
        assert_eq!(metrics.fdp_extension, Hours::ZERO);
        assert_eq!(metrics.flight_duration, Hours::from_hm(4, 0));
        assert!(!metrics.is_disruptive);
        assert!(metrics.warnings.is_empty());
    }

    #[test]
    fn test_split_duty_subtracts_break() {
        let mut input: DutyDayInput = duty("06:00", "20:00", 4);
        input.is_split_duty = true;
        input.break_start = Some("11:00".to_string());
        input.break_end = Some("14:30".to_string());
        let metrics: DayMetrics = metrics_for(&input, &RuleTable::default());
        assert_eq!(metrics.break_duration, Hours::from_hm(3, 30));
        assert_eq!(metrics.actual_fdp, Hours::from_hm(10, 30));
    }

    #[test]
    fn test_break_ignored_without_split_flag() {
        let mut input: DutyDayInput = duty("06:00", "18:00", 2);
        input.break_start = Some("11:00".to_string());
        input.break_end = Some("12:00".to_string());
        let metrics: DayMetrics = metrics_for(&input, &RuleTable::default());
        assert_eq!(metrics.break_duration, Hours::ZERO);
        assert_eq!(metrics.actual_fdp, Hours::from_hm(12, 0));
    }

    #[test]
    fn test_overnight_fdp_is_disruptive() {
        let metrics: DayMetrics = metrics_for(&duty("22:00", "04:00", 1), &RuleTable::default());
        assert_eq!(metrics.actual_fdp, Hours::from_hm(6, 0));
        assert!(metrics.is_disruptive);
        assert!(metrics.disruptive_violation.is_none());
    }

    #[test]
    fn test_fdp_ending_at_window_start_is_not_disruptive() {
        let metrics: DayMetrics = metrics_for(&duty("16:00", "02:00", 1), &RuleTable::default());
        assert!(!metrics.is_disruptive);
    }

    #[test]
    fn test_early_report_inside_window_is_disruptive() {
        let metrics: DayMetrics = metrics_for(&duty("05:30", "15:00", 2), &RuleTable::default());
        assert!(metrics.is_disruptive);
    }

    #[test]
    fn test_disruptive_violation_uses_reduced_limit() {
        // Report 17:00 allows 11:00; the disruptive limit is 10:00.
        let metrics: DayMetrics = metrics_for(&duty("17:00", "03:30", 1), &RuleTable::default());
        assert_eq!(metrics.actual_fdp, Hours::from_hm(10, 30));
        assert_eq!(metrics.max_fdp, Hours::from_hm(11, 0));
        assert!(metrics.is_disruptive);
        assert!(metrics.disruptive_violation.is_some());
        assert_eq!(metrics.fdp_extension, Hours::ZERO);
    }

    #[test]
    fn test_unrated_aircraft_warns() {
        let mut input: DutyDayInput = duty("06:00", "12:00", 1);
        input
            .flight_hours_by_aircraft
            .insert("B738".to_string(), 1.0);
        let metrics: DayMetrics = metrics_for(&input, &RuleTable::default());
        assert_eq!(
            metrics.warnings,
            vec![DayWarning::UnratedAircraft {
                aircraft: "B738".to_string()
            }]
        );
    }

    #[test]
    fn test_flight_time_without_fdp_warns() {
        let mut input: DutyDayInput = duty("06:00", "12:00", 1);
        input.fdp_start = None;
        input.fdp_end = None;
        let metrics: DayMetrics = metrics_for(&input, &RuleTable::default());
        assert_eq!(metrics.actual_fdp, Hours::ZERO);
        assert_eq!(metrics.max_fdp, Hours::ZERO);
        assert!(metrics.warnings.contains(&DayWarning::FlightTimeWithoutFdp {
            flight_duration: Hours::from_hm(4, 0)
        }));
    }

    #[test]
    fn test_zero_length_fdp_with_sectors_warns() {
        let metrics: DayMetrics = metrics_for(&duty("06:00", "06:00", 2), &RuleTable::default());
        assert_eq!(metrics.actual_fdp, Hours::ZERO);
        assert!(
            metrics
                .warnings
                .contains(&DayWarning::ZeroLengthFdpWithSectors { sectors: 2 })
        );
    }

    #[test]
    fn test_zero_length_fdp_without_sectors_is_clean() {
        let mut input: DutyDayInput = duty("06:00", "06:00", 0);
        input.flight_hours_by_aircraft.clear();
        input.sectors = None;
        let metrics: DayMetrics = metrics_for(&input, &RuleTable::default());
        assert!(metrics.warnings.is_empty());
    }

    #[test]
    fn test_half_entered_pair_warns() {
        let mut input: DutyDayInput = duty("06:00", "12:00", 1);
        input.standby_on = Some("04:00".to_string());
        let metrics: DayMetrics = metrics_for(&input, &RuleTable::default());
        assert!(metrics.warnings.contains(&DayWarning::HalfEnteredTimes {
            pair: "standby".to_string()
        }));
    }

    #[test]
    fn test_contiguous_standby_earns_credit() {
        let mut input: DutyDayInput = duty("08:00", "14:00", 2);
        input.standby_on = Some("04:00".to_string());
        input.standby_off = Some("07:30".to_string());
        let metrics: DayMetrics = metrics_for(&input, &RuleTable::default());
        assert_eq!(metrics.standby_duration, Hours::from_hm(3, 30));
        // 25 % of 3:30, rounded down to the minute.
        assert_eq!(metrics.standby_credit, Hours::from_minutes(52));
        assert_eq!(metrics.duty_contribution(), Hours::from_minutes(6 * 60 + 52));
        assert!(metrics.standby_violation.is_none());
    }

    #[test]
    fn test_detached_standby_earns_no_credit() {
        let mut input: DutyDayInput = duty("14:00", "20:00", 2);
        input.standby_on = Some("04:00".to_string());
        input.standby_off = Some("08:00".to_string());
        let metrics: DayMetrics = metrics_for(&input, &RuleTable::default());
        assert_eq!(metrics.standby_credit, Hours::ZERO);
        assert!(metrics.standby_violation.is_none());
    }

    #[test]
    fn test_standby_plus_fdp_limit() {
        // Standby 00:00-08:00 then FDP 08:00-19:00: 19h awake against 18h.
        let mut input: DutyDayInput = duty("08:00", "19:00", 1);
        input.standby_on = Some("00:00".to_string());
        input.standby_off = Some("08:00".to_string());
        let metrics: DayMetrics = metrics_for(&input, &RuleTable::default());
        let message: String = metrics.standby_violation.unwrap();
        assert!(message.contains("19:00"), "{message}");
    }

    #[test]
    fn test_excessive_standby_without_duty() {
        let mut input: DutyDayInput = DutyDayInput::new(date!(2026 - 03 - 10));
        input.standby_on = Some("06:00".to_string());
        input.standby_off = Some("23:00".to_string());
        let metrics: DayMetrics = metrics_for(&input, &RuleTable::default());
        assert_eq!(metrics.standby_credit, Hours::ZERO);
        assert!(metrics.standby_violation.is_some());
    }

    #[test]
    fn test_rule_table_gap_propagates() {
        let day: DutyDay = DutyDay::parse(&duty("06:00", "18:00", 12)).unwrap();
        let err: DomainError =
            calculate_day_metrics(&day, &RuleTable::default(), &profile()).unwrap_err();
        assert!(matches!(err, DomainError::RuleTableGap { sectors: 12, .. }));
    }

    #[test]
    fn test_assess_fdp_violation_without_extension() {
        let mut rules: RuleTable = RuleTable::default();
        rules.extension.max_uses = 0;
        let day: DutyDay = DutyDay::parse(&duty("06:00", "20:00", 2)).unwrap();
        let metrics: DayMetrics = calculate_day_metrics(&day, &rules, &profile()).unwrap();
        assert_eq!(metrics.fdp_extension, Hours::from_hm(1, 0));

        let check: FdpCheck = assess_fdp(&day, &metrics, &rules, 0);
        assert!(!check.extension_applied);
        assert_eq!(
            check.violation.as_deref(),
            Some("FDP 14:00 exceeds the maximum 13:00 by 1:00")
        );
    }

    #[test]
    fn test_assess_fdp_extension_covers_excess() {
        let rules: RuleTable = RuleTable::default();
        let day: DutyDay = DutyDay::parse(&duty("06:00", "20:00", 2)).unwrap();
        let metrics: DayMetrics = calculate_day_metrics(&day, &rules, &profile()).unwrap();

        let check: FdpCheck = assess_fdp(&day, &metrics, &rules, 1);
        assert!(check.extension_applied);
        assert!(check.violation.is_none());

        let check: FdpCheck = assess_fdp(&day, &metrics, &rules, 2);
        assert!(!check.extension_applied);
        assert!(check.violation.is_some());
    }

    #[test]
    fn test_touches_window_wrapping_window() {
        let window: (Time, Time) = (time!(22:00), time!(06:00));
        assert!(touches_window(time!(05:00), Hours::from_hm(2, 0), window));
        assert!(touches_window(time!(20:00), Hours::from_hm(2, 1), window));
        assert!(!touches_window(time!(06:00), Hours::from_hm(16, 0), window));
    }
}
