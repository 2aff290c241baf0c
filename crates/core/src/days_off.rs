// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Consecutive duty days and days off per rolling period.
//!
//! Both checks run in one pass over the combined history and target
//! sequence. Only `isDayOff` makes a day a day off; a blank record with no
//! times entered still counts as a duty day.

use crate::result::DaysOffCheck;
use crew_ftl_domain::clock::days_between;
use crew_ftl_domain::{DaysOffPolicy, DutyDay};

/// A period breach first seen on a day off, waiting for a duty day to carry it.
#[derive(Debug)]
struct PendingBreach {
    message: String,
    /// Most recent duty day inside the breached period.
    last_duty: Option<usize>,
}

/// Validates consecutive duty days and days off per rolling period.
///
/// `days` must be sorted by date with no duplicates. A missing calendar day
/// ends a run of duty days; a day that is not marked off counts toward the
/// run even when no times are entered. The period check only applies once
/// every day of the period has a record.
///
/// A breach is reported once, on the day it starts. Day-off days are never
/// flagged: a breach that starts on a day off is carried to the next duty
/// day, or, if the sequence has none, to the last duty day inside the
/// breached period.
#[must_use]
pub fn validate_days_off(days: &[DutyDay], policy: &DaysOffPolicy) -> Vec<DaysOffCheck> {
    let period: i64 = i64::from(policy.period_days);
    let mut run: u32 = 0;
    let mut tail: usize = 0;
    let mut days_off_in_period: u16 = 0;
    let mut in_period_breach: bool = false;
    let mut pending: Vec<PendingBreach> = Vec::new();
    let mut last_duty: Option<usize> = None;

    let mut messages: Vec<Vec<String>> = Vec::with_capacity(days.len());

    for (head, day) in days.iter().enumerate() {
        let follows_previous: bool =
            head > 0 && days_between(days[head - 1].date, day.date) == 1;

        if day.is_day_off {
            run = 0;
            days_off_in_period += 1;
        } else if follows_previous {
            run += 1;
        } else {
            run = 1;
        }

        while tail < head && days_between(days[tail].date, day.date) >= period {
            if days[tail].is_day_off {
                days_off_in_period -= 1;
            }
            tail += 1;
        }

        let mut day_messages: Vec<String> = Vec::new();

        if !day.is_day_off {
            day_messages.extend(pending.drain(..).map(|breach| breach.message));
            if run == policy.max_consecutive_duty_days.saturating_add(1) {
                day_messages.push(format!(
                    "{run} consecutive duty days exceed the maximum of {}",
                    policy.max_consecutive_duty_days
                ));
            }
        }

        let covered: bool = i64::try_from(head + 1 - tail).is_ok_and(|n| n == period);
        let breached: bool = covered && days_off_in_period < policy.min_days_off_in_period;
        if !breached {
            in_period_breach = false;
        } else if !in_period_breach {
            in_period_breach = true;
            let message: String = format!(
                "Only {days_off_in_period} days off in the {period} days ending {}, {} required",
                day.date, policy.min_days_off_in_period
            );
            if day.is_day_off {
                pending.push(PendingBreach { message, last_duty });
            } else {
                day_messages.push(message);
            }
        }

        if !day.is_day_off {
            last_duty = Some(head);
        }
        messages.push(day_messages);
    }

    for breach in pending {
        if let Some(index) = breach.last_duty {
            messages[index].push(breach.message);
        }
    }

    messages
        .into_iter()
        .map(|day_messages: Vec<String>| DaysOffCheck {
            violation: (!day_messages.is_empty()).then(|| day_messages.join("; ")),
        })
        .collect()
}
