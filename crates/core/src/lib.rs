// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

//! Flight duty time limitation compliance engine.
//!
//! The engine is a pure function of raw day records, the pilot profile and a
//! rule table. It holds no state and performs no I/O; the host calls
//! [`recalculate_month`] after every edit and discards the previous results.

mod day_metrics;
mod days_off;
mod error;
mod recalculate;
mod rest;
mod result;
mod rolling;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use day_metrics::{DayMetrics, assess_fdp, calculate_day_metrics};
pub use days_off::validate_days_off;
pub use error::EngineError;
pub use recalculate::recalculate_month;
pub use rest::evaluate_rest_periods;
pub use result::{
    CumulativeCheck, DaysOffCheck, DayWarning, DisruptiveCheck, DutyDayResult, FdpCheck,
    RestCheck, RollingMetrics, StandbyCheck, any_violation,
};
pub use rolling::{DailyTotals, aggregate_rolling_windows, check_cumulative_limits};
