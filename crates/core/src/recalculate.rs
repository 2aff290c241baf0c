// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Full recomputation of one pilot month.
//!
//! The target month is evaluated together with the historic records that
//! precede it, so rest, rolling windows, extension usage and days-off runs
//! all see across the month boundary. Only target-month days are returned.

use crate::day_metrics::{DayMetrics, assess_fdp, calculate_day_metrics};
use crate::days_off::validate_days_off;
use crate::error::EngineError;
use crate::rest::evaluate_rest_periods;
use crate::result::{
    CumulativeCheck, DaysOffCheck, DisruptiveCheck, DutyDayResult, FdpCheck, RestCheck,
    RollingMetrics, StandbyCheck,
};
use crate::rolling::{DailyTotals, aggregate_rolling_windows, check_cumulative_limits};
use crew_ftl_domain::clock::{add_days, days_between, month_days};
use crew_ftl_domain::{DutyDay, DutyDayInput, PilotProfile, RuleTable};
use std::collections::VecDeque;
use time::Date;

/// Recomputes every derived field for one calendar month.
///
/// # Arguments
///
/// * `target` - One record per day of the month, in date order
/// * `historic` - Earlier records in any order (up to a year is used)
/// * `profile` - The pilot's ratings and role
/// * `rules` - The rule table in force
///
/// # Returns
///
/// One `DutyDayResult` per target day, in date order. Regulatory violations
/// are reported on the days they occur and never cause an error.
///
/// # Errors
///
/// Returns an error if:
/// - `target` is empty, does not start on the 1st, or does not cover
///   exactly one calendar month
/// - A target day is out of sequence
/// - `historic` contains duplicates or dates inside or after the month
/// - Any record is malformed
/// - The rule table has no max FDP for a day's report time and sectors
pub fn recalculate_month(
    target: &[DutyDayInput],
    historic: &[DutyDayInput],
    profile: &PilotProfile,
    rules: &RuleTable,
) -> Result<Vec<DutyDayResult>, EngineError> {
    let month_start: Date = validate_month(target)?;
    let history: Vec<&DutyDayInput> = order_history(historic, month_start)?;

    let span: tracing::Span = tracing::debug_span!(
        "recalculate_month",
        month = %month_start,
        historic_days = history.len(),
        rules = %rules.version
    );
    let _entered = span.enter();

    let days: Vec<DutyDay> = history
        .iter()
        .copied()
        .chain(target)
        .map(DutyDay::parse)
        .collect::<Result<_, _>>()?;

    let metrics: Vec<DayMetrics> = days
        .iter()
        .map(|day| calculate_day_metrics(day, rules, profile))
        .collect::<Result<_, _>>()?;

    let fdp_checks: Vec<FdpCheck> = assess_fdp_sequence(&days, &metrics, rules);
    let rest_checks: Vec<RestCheck> = evaluate_rest_periods(&days, &metrics, rules)?;

    let totals: Vec<DailyTotals> = days
        .iter()
        .zip(&metrics)
        .map(|(day, m)| DailyTotals {
            date: day.date,
            flight: m.flight_duration,
            duty: m.duty_contribution(),
        })
        .collect();
    let rolling: Vec<RollingMetrics> = aggregate_rolling_windows(&totals);
    let days_off: Vec<DaysOffCheck> = validate_days_off(&days, &rules.days_off);

    // History occupies the front of every parallel vector.
    let skip: usize = history.len();
    let results: Vec<DutyDayResult> = target
        .iter()
        .zip(metrics.into_iter().skip(skip))
        .zip(fdp_checks.into_iter().skip(skip))
        .zip(rest_checks.into_iter().skip(skip))
        .zip(rolling.into_iter().skip(skip))
        .zip(days_off.into_iter().skip(skip))
        .map(|(((((input, m), fdp), rest), rolling), days_off)| {
            build_result(input, m, fdp, rest, rolling, days_off, rules)
        })
        .collect();

    tracing::debug!(
        days = results.len(),
        days_with_violations = results.iter().filter(|r| r.has_violation()).count(),
        warnings = results.iter().map(|r| r.warnings.len()).sum::<usize>(),
        "Recalculated month"
    );

    Ok(results)
}

/// Checks that `target` covers exactly one calendar month, day by day.
///
/// Returns the first day of the month.
fn validate_month(target: &[DutyDayInput]) -> Result<Date, EngineError> {
    let first: Date = target.first().ok_or(EngineError::EmptyMonth)?.date;

    if first.day() != 1 {
        return Err(EngineError::InvalidMonth {
            first,
            reason: String::from("the first record is not the 1st of the month"),
        });
    }

    let length: u8 = month_days(first.year(), first.month())?;
    if target.len() != usize::from(length) {
        return Err(EngineError::InvalidMonth {
            first,
            reason: format!("expected {length} records, got {}", target.len()),
        });
    }

    for (offset, day) in (0_i64..).zip(target) {
        let expected: Date = add_days(first, offset)?;
        if day.date != expected {
            return Err(EngineError::DayOutOfSequence {
                expected,
                found: day.date,
            });
        }
    }

    Ok(first)
}

/// Sorts the historic records and rejects duplicates and overlap.
fn order_history(
    historic: &[DutyDayInput],
    month_start: Date,
) -> Result<Vec<&DutyDayInput>, EngineError> {
    let mut history: Vec<&DutyDayInput> = historic.iter().collect();
    history.sort_by_key(|day| day.date);

    if let Some(day) = history.iter().find(|day| day.date >= month_start) {
        return Err(EngineError::HistoryOverlapsMonth {
            date: day.date,
            month_start,
        });
    }
    if let Some(pair) = history.windows(2).find(|pair| pair[0].date == pair[1].date) {
        return Err(EngineError::DuplicateHistoricDay(pair[0].date));
    }

    Ok(history)
}

/// Consolidated FDP verdicts, counting extensions used in the lookback period.
fn assess_fdp_sequence(
    days: &[DutyDay],
    metrics: &[DayMetrics],
    rules: &RuleTable,
) -> Vec<FdpCheck> {
    let lookback: i64 = i64::from(rules.extension.lookback_days);
    let mut used_on: VecDeque<Date> = VecDeque::new();

    days.iter()
        .zip(metrics)
        .map(|(day, m)| {
            while used_on
                .front()
                .is_some_and(|&used| days_between(used, day.date) >= lookback)
            {
                used_on.pop_front();
            }

            let uses: u32 = u32::try_from(used_on.len()).unwrap_or(u32::MAX);
            let check: FdpCheck = assess_fdp(day, m, rules, uses);
            if check.extension_applied {
                used_on.push_back(day.date);
            }
            check
        })
        .collect()
}

/// Merges the per-day outputs. Days off carry no violations of their own.
fn build_result(
    input: &DutyDayInput,
    m: DayMetrics,
    fdp: FdpCheck,
    rest: RestCheck,
    rolling: RollingMetrics,
    days_off: DaysOffCheck,
    rules: &RuleTable,
) -> DutyDayResult {
    for warning in &m.warnings {
        tracing::warn!(date = %input.date, %warning, "Duty record inconsistency");
    }

    DutyDayResult {
        input: input.clone(),
        flight_duration: m.flight_duration,
        actual_fdp: m.actual_fdp,
        max_fdp: m.max_fdp,
        fdp_extension: m.fdp_extension,
        break_duration: m.break_duration,
        standby_credit: m.standby_credit,
        fdp,
        metrics: rolling,
        rest,
        disruptive: DisruptiveCheck {
            is_disruptive: m.is_disruptive,
            disruptive_violation: m.disruptive_violation,
        },
        standby: StandbyCheck {
            standby_violation: m.standby_violation,
        },
        days_off_validation: days_off,
        cumulative: CumulativeCheck {
            violation: if input.is_day_off {
                None
            } else {
                check_cumulative_limits(&rolling, &rules.cumulative)
            },
        },
        warnings: m.warnings,
    }
}
