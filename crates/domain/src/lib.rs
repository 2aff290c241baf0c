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

pub mod clock;
mod duty_day;
mod error;
mod hours;
mod rule_table;

#[cfg(test)]
mod tests;

// Re-export public types
pub use duty_day::{CrewComplement, CrewRole, DutyDay, DutyDayInput, PilotProfile, TimePair};
pub use error::DomainError;
pub use hours::Hours;
pub use rule_table::{
    CumulativeLimits, DaysOffPolicy, DisruptivePolicy, ExtensionContext, ExtensionPolicy,
    FdpBand, FdpQuery, MinimumRestPolicy, RestBoundary, RuleTable, SectorStep, StandbyPolicy,
};
