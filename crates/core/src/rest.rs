// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rest between consecutive duties.

use crate::day_metrics::DayMetrics;
use crate::result::RestCheck;
use crew_ftl_domain::clock::{at, interval_end};
use crew_ftl_domain::{DomainError, DutyDay, Hours, RestBoundary, RuleTable, TimePair};
use time::{PrimitiveDateTime, Time};

/// The most recent duty end seen so far.
#[derive(Debug, Clone, Copy)]
struct Anchor {
    end: PrimitiveDateTime,
    fdp: Hours,
}

/// Evaluates rest before every day in a chronological sequence.
///
/// `days` and `metrics` are parallel slices over the combined history and
/// target sequence. Days off and days without a start boundary leave the
/// anchor untouched, so rest is always measured back to the last real duty.
/// They report no rest period, but `has_history` is still set once any
/// earlier duty end exists.
///
/// # Errors
///
/// Returns `DomainError::DateArithmeticOverflow` if an overnight duty end
/// cannot be resolved to an absolute date.
pub fn evaluate_rest_periods(
    days: &[DutyDay],
    metrics: &[DayMetrics],
    rules: &RuleTable,
) -> Result<Vec<RestCheck>, DomainError> {
    let mut anchor: Option<Anchor> = None;
    let mut checks: Vec<RestCheck> = Vec::with_capacity(days.len());

    for (day, day_metrics) in days.iter().zip(metrics) {
        let idle: RestCheck = RestCheck {
            has_history: anchor.is_some(),
            ..RestCheck::default()
        };
        if day.is_day_off {
            checks.push(idle);
            continue;
        }

        let (start, end) = boundaries(day, rules.rest_boundary);
        let Some(start) = start else {
            checks.push(idle);
            continue;
        };

        let check: RestCheck = match anchor {
            Some(previous) => {
                let elapsed: Hours = Hours::from_duration(at(day.date, start) - previous.end);
                let rest_period: Hours = elapsed.max(Hours::ZERO);
                let required: Hours = rules.minimum_rest(previous.fdp);
                RestCheck {
                    rest_period,
                    has_history: true,
                    rest_violation: (rest_period < required).then(|| {
                        format!("Rest {rest_period} is below the required minimum {required}")
                    }),
                }
            }
            None => idle,
        };
        checks.push(check);

        if let Some(end) = end {
            anchor = Some(Anchor {
                end: interval_end(day.date, start, end)?,
                fdp: day_metrics.actual_fdp,
            });
        }
    }

    Ok(checks)
}

/// Start and end of the period delimiting rest, falling back to the other
/// pair when the preferred one is not entered.
fn boundaries(day: &DutyDay, boundary: RestBoundary) -> (Option<Time>, Option<Time>) {
    let (preferred, fallback): (&TimePair, &TimePair) = match boundary {
        RestBoundary::DutyPeriod => (&day.duty, &day.fdp),
        RestBoundary::FlightDutyPeriod => (&day.fdp, &day.duty),
    };
    (
        preferred.start.or(fallback.start),
        preferred.end.or(fallback.end),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::day_metrics::calculate_day_metrics;
    use crew_ftl_domain::{CrewRole, DutyDayInput, PilotProfile};
    use time::Date;
    use time::macros::date;

    fn duty(date: Date, start: &str, end: &str) -> DutyDayInput {
        let mut input: DutyDayInput = DutyDayInput::new(date);
        input.duty_start = Some(start.to_string());
        input.duty_end = Some(end.to_string());
        input.fdp_start = Some(start.to_string());
        input.fdp_end = Some(end.to_string());
        input.sectors = Some(2);
        input
    }

    fn evaluate(inputs: &[DutyDayInput], rules: &RuleTable) -> Vec<RestCheck> {
        let profile: PilotProfile = PilotProfile::new(["A320"], CrewRole::Captain);
        let days: Vec<DutyDay> = inputs.iter().map(|i| DutyDay::parse(i).unwrap()).collect();
        let metrics: Vec<DayMetrics> = days
            .iter()
            .map(|d| calculate_day_metrics(d, rules, &profile).unwrap())
            .collect();
        evaluate_rest_periods(&days, &metrics, rules).unwrap()
    }

    #[test]
    fn test_first_duty_has_no_history() {
        let checks: Vec<RestCheck> = evaluate(
            &[duty(date!(2026 - 03 - 01), "06:00", "14:00")],
            &RuleTable::default(),
        );
        assert_eq!(checks, vec![RestCheck::default()]);
    }

    #[test]
    fn test_day_off_before_any_duty_has_no_history() {
        let checks: Vec<RestCheck> = evaluate(
            &[
                DutyDayInput::day_off(date!(2026 - 03 - 01)),
                duty(date!(2026 - 03 - 02), "06:00", "14:00"),
                DutyDayInput::day_off(date!(2026 - 03 - 03)),
            ],
            &RuleTable::default(),
        );
        assert_eq!(checks[0], RestCheck::default());
        assert!(!checks[1].has_history);
        assert!(checks[2].has_history);
        assert_eq!(checks[2].rest_period, Hours::ZERO);
    }

    #[test]
    fn test_overnight_duty_ends_next_day() {
        let mut rules: RuleTable = RuleTable::default();
        rules.minimum_rest.floor = Hours::from_hm(10, 0);
        let checks: Vec<RestCheck> = evaluate(
            &[
                duty(date!(2026 - 03 - 01), "14:00", "22:00"),
                duty(date!(2026 - 03 - 02), "06:00", "12:00"),
            ],
            &rules,
        );
        assert_eq!(checks[1].rest_period, Hours::from_hm(8, 0));
        assert!(checks[1].has_history);
        assert_eq!(
            checks[1].rest_violation.as_deref(),
            Some("Rest 8:00 is below the required minimum 10:00")
        );
    }

    #[test]
    fn test_rest_walks_back_over_days_off() {
        let checks: Vec<RestCheck> = evaluate(
            &[
                duty(date!(2026 - 03 - 01), "06:00", "18:00"),
                DutyDayInput::day_off(date!(2026 - 03 - 02)),
                DutyDayInput::new(date!(2026 - 03 - 03)),
                duty(date!(2026 - 03 - 04), "08:00", "16:00"),
            ],
            &RuleTable::default(),
        );
        for idle in &checks[1..3] {
            assert!(idle.has_history);
            assert_eq!(idle.rest_period, Hours::ZERO);
            assert!(idle.rest_violation.is_none());
        }
        assert_eq!(checks[3].rest_period, Hours::from_hm(62, 0));
        assert!(checks[3].rest_violation.is_none());
    }

    #[test]
    fn test_minimum_rest_scales_with_preceding_fdp() {
        // A 13:30 FDP requires 13:30 rest; 13:00 is too short.
        let checks: Vec<RestCheck> = evaluate(
            &[
                duty(date!(2026 - 03 - 01), "06:00", "19:30"),
                duty(date!(2026 - 03 - 02), "08:30", "12:00"),
            ],
            &RuleTable::default(),
        );
        assert_eq!(checks[1].rest_period, Hours::from_hm(13, 0));
        assert!(checks[1].rest_violation.is_some());
    }

    #[test]
    fn test_overlapping_duties_clamp_to_zero() {
        let checks: Vec<RestCheck> = evaluate(
            &[
                duty(date!(2026 - 03 - 01), "20:00", "08:00"),
                duty(date!(2026 - 03 - 02), "06:00", "10:00"),
            ],
            &RuleTable::default(),
        );
        assert_eq!(checks[1].rest_period, Hours::ZERO);
        assert!(checks[1].rest_violation.is_some());
    }

    #[test]
    fn test_flight_duty_boundary_uses_fdp_times() {
        let mut rules: RuleTable = RuleTable::default();
        rules.rest_boundary = RestBoundary::FlightDutyPeriod;

        let mut first: DutyDayInput = duty(date!(2026 - 03 - 01), "06:00", "16:00");
        first.duty_end = Some("16:30".to_string());
        let mut second: DutyDayInput = duty(date!(2026 - 03 - 02), "05:00", "10:00");
        second.duty_start = Some("04:30".to_string());

        let checks: Vec<RestCheck> = evaluate(&[first.clone(), second.clone()], &rules);
        assert_eq!(checks[1].rest_period, Hours::from_hm(13, 0));

        let checks: Vec<RestCheck> = evaluate(&[first, second], &RuleTable::default());
        assert_eq!(checks[1].rest_period, Hours::from_hm(12, 0));
    }

    #[test]
    fn test_missing_duty_falls_back_to_fdp() {
        let mut input: DutyDayInput = duty(date!(2026 - 03 - 02), "07:00", "12:00");
        input.duty_start = None;
        input.duty_end = None;
        let checks: Vec<RestCheck> = evaluate(
            &[duty(date!(2026 - 03 - 01), "06:00", "15:00"), input],
            &RuleTable::default(),
        );
        assert_eq!(checks[1].rest_period, Hours::from_hm(16, 0));
    }
}
