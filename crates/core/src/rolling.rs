// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Trailing duty and flight totals.
//!
//! Windows are calendar-day windows `[D - (W - 1), D]`. Missing days and days
//! off contribute nothing. Each window is a two-pointer sliding sum, so the
//! whole sequence is aggregated in a single pass per window.

use crate::result::RollingMetrics;
use crew_ftl_domain::clock::days_between;
use crew_ftl_domain::{CumulativeLimits, Hours};
use time::Date;

/// The longest window; also the cap on `coverage_days`.
const LONGEST_WINDOW_DAYS: i64 = 365;

/// Per-day contributions to the rolling windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTotals {
    /// The calendar day.
    pub date: Date,
    /// Flight time flown that day.
    pub flight: Hours,
    /// Duty time credited that day.
    pub duty: Hours,
}

/// Which total a window sums.
#[derive(Debug, Clone, Copy)]
enum Measure {
    Flight,
    Duty,
}

impl Measure {
    const fn of(self, totals: &DailyTotals) -> Hours {
        match self {
            Self::Flight => totals.flight,
            Self::Duty => totals.duty,
        }
    }
}

#[derive(Debug)]
struct SlidingSum {
    days: i64,
    measure: Measure,
    tail: usize,
    sum: Hours,
}

impl SlidingSum {
    const fn new(days: i64, measure: Measure) -> Self {
        Self {
            days,
            measure,
            tail: 0,
            sum: Hours::ZERO,
        }
    }

    /// Adds `totals[head]` and evicts entries that fell out of the window.
    fn advance(&mut self, totals: &[DailyTotals], head: usize) -> Hours {
        let today: Date = totals[head].date;
        self.sum += self.measure.of(&totals[head]);
        while self.tail < head && days_between(totals[self.tail].date, today) >= self.days {
            self.sum -= self.measure.of(&totals[self.tail]);
            self.tail += 1;
        }
        self.sum
    }

    /// Number of entries currently inside the window.
    const fn len(&self, head: usize) -> usize {
        head + 1 - self.tail
    }
}

/// Computes the trailing totals for every entry.
///
/// `totals` must be sorted by date with no duplicate dates; the returned
/// vector is parallel to it.
#[must_use]
pub fn aggregate_rolling_windows(totals: &[DailyTotals]) -> Vec<RollingMetrics> {
    let mut duty_7d: SlidingSum = SlidingSum::new(7, Measure::Duty);
    let mut duty_28d: SlidingSum = SlidingSum::new(28, Measure::Duty);
    let mut flight_3d: SlidingSum = SlidingSum::new(3, Measure::Flight);
    let mut flight_7d: SlidingSum = SlidingSum::new(7, Measure::Flight);
    let mut flight_28d: SlidingSum = SlidingSum::new(28, Measure::Flight);
    let mut flight_90d: SlidingSum = SlidingSum::new(90, Measure::Flight);
    let mut flight_365d: SlidingSum = SlidingSum::new(LONGEST_WINDOW_DAYS, Measure::Flight);

    (0..totals.len())
        .map(|head: usize| {
            let flight_time_365d: Hours = flight_365d.advance(totals, head);
            RollingMetrics {
                duty_time_7d: duty_7d.advance(totals, head),
                duty_time_28d: duty_28d.advance(totals, head),
                flight_time_3d: flight_3d.advance(totals, head),
                flight_time_7d: flight_7d.advance(totals, head),
                flight_time_28d: flight_28d.advance(totals, head),
                flight_time_90d: flight_90d.advance(totals, head),
                flight_time_365d,
                coverage_days: u16::try_from(flight_365d.len(head)).unwrap_or(u16::MAX),
            }
        })
        .collect()
}

/// Compares rolling totals against the configured cumulative limits.
///
/// Returns every exceeded limit in one message, or `None`.
#[must_use]
pub fn check_cumulative_limits(
    metrics: &RollingMetrics,
    limits: &CumulativeLimits,
) -> Option<String> {
    let checks: [(&str, Hours, Option<Hours>); 7] = [
        ("7-day duty", metrics.duty_time_7d, limits.duty_7d),
        ("28-day duty", metrics.duty_time_28d, limits.duty_28d),
        ("3-day flight", metrics.flight_time_3d, limits.flight_3d),
        ("7-day flight", metrics.flight_time_7d, limits.flight_7d),
        ("28-day flight", metrics.flight_time_28d, limits.flight_28d),
        ("90-day flight", metrics.flight_time_90d, limits.flight_90d),
        ("365-day flight", metrics.flight_time_365d, limits.flight_365d),
    ];

    let exceeded: Vec<String> = checks
        .iter()
        .filter_map(|&(label, total, limit)| {
            let limit: Hours = limit?;
            (total > limit).then(|| format!("{label} time {total} exceeds the limit {limit}"))
        })
        .collect();

    if exceeded.is_empty() {
        None
    } else {
        Some(exceeded.join("; "))
    }
}
