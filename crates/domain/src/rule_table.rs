// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Versioned, injectable FTL rule tables.
//!
//! A `RuleTable` carries every jurisdiction-specific threshold the engine
//! evaluates against. It is plain data: loaded from configuration, validated
//! once, and then shared read-only for the lifetime of a computation.
//!
//! ## Invariants
//!
//! - More sectors never increase max FDP (sector ladders are non-increasing)
//! - A two-pilot lookup is never lower than the single-pilot lookup for the
//!   same report time and sector count
//! - A lookup with no covering band is an error, never "no limit"

use crate::clock::{hhmm, minute_of_day};
use crate::duty_day::CrewComplement;
use crate::error::DomainError;
use crate::hours::Hours;
use serde::{Deserialize, Serialize};
use time::Time;
use time::macros::time;

/// One step of a sector ladder: up to `max_sectors` sectors allow `max_fdp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorStep {
    /// Highest sector count covered by this step.
    pub max_sectors: u32,
    /// Maximum FDP for this step.
    pub max_fdp: Hours,
}

/// Max FDP for one report-time band.
///
/// The band covers report times in `[report_from, report_until)`. A band whose
/// end is earlier than its start wraps past midnight; equal bounds cover the
/// whole day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FdpBand {
    /// First report time covered.
    #[serde(with = "hhmm")]
    pub report_from: Time,
    /// First report time no longer covered.
    #[serde(with = "hhmm")]
    pub report_until: Time,
    /// Restrict the band to one crew complement. `None` applies to any crew.
    #[serde(default)]
    pub crew: Option<CrewComplement>,
    /// Sector ladder, ordered by ascending `max_sectors`.
    pub sector_ladder: Vec<SectorStep>,
}

impl FdpBand {
    /// Returns whether `report_time` falls inside this band.
    #[must_use]
    pub fn covers(&self, report_time: Time) -> bool {
        let from: i64 = minute_of_day(self.report_from);
        let until: i64 = minute_of_day(self.report_until);
        let at: i64 = minute_of_day(report_time);

        match from.cmp(&until) {
            std::cmp::Ordering::Less => from <= at && at < until,
            std::cmp::Ordering::Greater => at >= from || at < until,
            std::cmp::Ordering::Equal => true,
        }
    }

    /// Max FDP for `sectors`, if the ladder reaches that far.
    #[must_use]
    pub fn limit_for(&self, sectors: u32) -> Option<Hours> {
        self.sector_ladder
            .iter()
            .find(|step| sectors <= step.max_sectors)
            .map(|step| step.max_fdp)
    }
}

/// Circadian-low window and its effect on max FDP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisruptivePolicy {
    /// Window start.
    #[serde(with = "hhmm")]
    pub window_start: Time,
    /// Window end (exclusive). Earlier than the start means the window wraps.
    #[serde(with = "hhmm")]
    pub window_end: Time,
    /// Reduction applied to max FDP when the FDP touches the window.
    pub max_fdp_reduction: Hours,
}

/// Which boundaries delimit a rest period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RestBoundary {
    /// From duty release to the next duty report.
    #[default]
    DutyPeriod,
    /// From the end of the FDP to the start of the next FDP.
    FlightDutyPeriod,
}

/// Minimum rest formula: `max(floor, preceding × preceding_duty_percent / 100)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimumRestPolicy {
    /// Absolute minimum rest.
    pub floor: Hours,
    /// Rest as a percentage of the preceding duty.
    pub preceding_duty_percent: u32,
}

/// Standby credit and standby limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandbyPolicy {
    /// Share of contiguous standby counted as duty.
    pub credit_percent: u32,
    /// Standby ending at most this long before report still leads into the FDP.
    pub contiguity_tolerance: Hours,
    /// Longest permitted standby.
    pub max_standby: Hours,
    /// Longest permitted standby plus the FDP it leads into.
    pub max_standby_plus_fdp: Hours,
}

/// FDP extension eligibility.
///
/// Setting `max_extension` or `max_uses` to zero disables extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionPolicy {
    /// Largest excess over max FDP an extension may cover.
    pub max_extension: Hours,
    /// Most sectors an extended FDP may contain.
    pub max_sectors: u32,
    /// Whether a disruptive FDP may be extended.
    pub allow_disruptive: bool,
    /// Extensions allowed within `lookback_days` consecutive days.
    pub max_uses: u32,
    /// Length of the extension counting window, including the current day.
    pub lookback_days: u16,
}

/// Consecutive duty days and days-off requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaysOffPolicy {
    /// Longest permitted run of duty days.
    pub max_consecutive_duty_days: u32,
    /// Length of the rolling period checked for days off.
    pub period_days: u16,
    /// Days off required within each rolling period.
    pub min_days_off_in_period: u16,
}

/// Optional limits on the rolling totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CumulativeLimits {
    /// Duty time in 7 days.
    pub duty_7d: Option<Hours>,
    /// Duty time in 28 days.
    pub duty_28d: Option<Hours>,
    /// Flight time in 3 days.
    pub flight_3d: Option<Hours>,
    /// Flight time in 7 days.
    pub flight_7d: Option<Hours>,
    /// Flight time in 28 days.
    pub flight_28d: Option<Hours>,
    /// Flight time in 90 days.
    pub flight_90d: Option<Hours>,
    /// Flight time in 365 days.
    pub flight_365d: Option<Hours>,
}

/// A max FDP lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdpQuery {
    /// Report time (FDP start).
    pub report_time: Time,
    /// Sector count.
    pub sectors: u32,
    /// Crew complement.
    pub crew: CrewComplement,
    /// Whether the FDP is split.
    pub split_duty: bool,
    /// Whether the disruptive-adjusted limit is requested.
    pub disruptive: bool,
}

/// Context for the FDP extension predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionContext {
    /// Amount by which the FDP exceeds max FDP.
    pub excess: Hours,
    /// Sector count of the FDP.
    pub sectors: u32,
    /// Whether the FDP is disruptive.
    pub disruptive: bool,
    /// Extensions already used in the preceding `lookback_days - 1` days.
    pub uses_in_lookback: u32,
}

/// The complete set of thresholds for one regulatory regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTable {
    /// Human-readable version label.
    pub version: String,
    /// Max FDP bands.
    pub fdp_bands: Vec<FdpBand>,
    /// Added to max FDP for split duty.
    pub split_duty_allowance: Hours,
    /// Circadian-low window.
    pub disruptive: DisruptivePolicy,
    /// Rest period boundaries.
    #[serde(default)]
    pub rest_boundary: RestBoundary,
    /// Minimum rest formula.
    pub minimum_rest: MinimumRestPolicy,
    /// Standby rules.
    pub standby: StandbyPolicy,
    /// FDP extension rules.
    pub extension: ExtensionPolicy,
    /// Days-off rules.
    pub days_off: DaysOffPolicy,
    /// Rolling-total limits.
    #[serde(default)]
    pub cumulative: CumulativeLimits,
}

impl RuleTable {
    /// Looks up the maximum FDP.
    ///
    /// Crew-specific bands take precedence over crew-agnostic ones. A two-pilot
    /// lookup takes the larger of the two-pilot and single-pilot values.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RuleTableGap` if no band and ladder step covers the
    /// report time and sector count.
    pub fn max_fdp(&self, query: &FdpQuery) -> Result<Hours, DomainError> {
        let single: Option<Hours> =
            self.base_limit(query.report_time, query.sectors, CrewComplement::SinglePilot);

        let base: Option<Hours> = match query.crew {
            CrewComplement::SinglePilot => single,
            CrewComplement::TwoPilot => {
                let two: Option<Hours> =
                    self.base_limit(query.report_time, query.sectors, CrewComplement::TwoPilot);
                match (two, single) {
                    (Some(two), Some(single)) => Some(two.max(single)),
                    (two, single) => two.or(single),
                }
            }
        };

        let mut limit: Hours = base.ok_or_else(|| DomainError::RuleTableGap {
            version: self.version.clone(),
            report_time: query.report_time,
            sectors: query.sectors,
        })?;

        if query.split_duty {
            limit += self.split_duty_allowance;
        }
        if query.disruptive {
            limit = limit.saturating_sub(self.disruptive.max_fdp_reduction);
        }
        Ok(limit)
    }

    /// The disruptive (circadian-low) window as `(start, end)`.
    #[must_use]
    pub const fn disruptive_window(&self) -> (Time, Time) {
        (self.disruptive.window_start, self.disruptive.window_end)
    }

    /// Minimum rest required after a duty of `preceding_fdp`.
    #[must_use]
    pub fn minimum_rest(&self, preceding_fdp: Hours) -> Hours {
        self.minimum_rest.floor.max(
            preceding_fdp.percent(self.minimum_rest.preceding_duty_percent),
        )
    }

    /// Duty-equivalent credit for a contiguous standby of `standby`.
    #[must_use]
    pub fn standby_credit(&self, standby: Hours) -> Hours {
        standby.percent(self.standby.credit_percent)
    }

    /// Whether an FDP exceeding max FDP may be covered by an extension.
    #[must_use]
    pub fn extension_allowed(&self, context: &ExtensionContext) -> bool {
        let policy: &ExtensionPolicy = &self.extension;
        if policy.max_extension.is_zero() || policy.max_uses == 0 {
            return false;
        }
        context.excess <= policy.max_extension
            && context.sectors <= policy.max_sectors
            && (!context.disruptive || policy.allow_disruptive)
            && context.uses_in_lookback < policy.max_uses
    }

    /// Checks the table for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRuleTable` if:
    /// - The version label is empty
    /// - There are no FDP bands, or a band has an empty ladder
    /// - A ladder's sector counts do not strictly increase
    /// - A ladder's max FDP increases with sector count, or is zero
    /// - The disruptive reduction would wipe out any ladder value
    /// - The standby credit exceeds 100 %
    /// - The days-off period is shorter than the required days off
    /// - Extensions are enabled with a zero-day lookback
    pub fn validate(&self) -> Result<(), DomainError> {
        let invalid = |reason: String| DomainError::InvalidRuleTable {
            version: self.version.clone(),
            reason,
        };

        if self.version.trim().is_empty() {
            return Err(invalid(String::from("version must not be empty")));
        }
        if self.fdp_bands.is_empty() {
            return Err(invalid(String::from("at least one FDP band is required")));
        }

        for (idx, band) in self.fdp_bands.iter().enumerate() {
            if band.sector_ladder.is_empty() {
                return Err(invalid(format!("FDP band {idx} has an empty sector ladder")));
            }
            for pair in band.sector_ladder.windows(2) {
                if pair[1].max_sectors <= pair[0].max_sectors {
                    return Err(invalid(format!(
                        "FDP band {idx}: sector counts must strictly increase"
                    )));
                }
                if pair[1].max_fdp > pair[0].max_fdp {
                    return Err(invalid(format!(
                        "FDP band {idx}: max FDP must not increase with more sectors"
                    )));
                }
            }
            for step in &band.sector_ladder {
                if step.max_fdp <= self.disruptive.max_fdp_reduction {
                    return Err(invalid(format!(
                        "FDP band {idx}: max FDP {} does not exceed the disruptive reduction {}",
                        step.max_fdp, self.disruptive.max_fdp_reduction
                    )));
                }
            }
        }

        if self.standby.credit_percent > 100 {
            return Err(invalid(format!(
                "standby credit {}% exceeds 100%",
                self.standby.credit_percent
            )));
        }
        if self.days_off.period_days < self.days_off.min_days_off_in_period {
            return Err(invalid(format!(
                "days-off period of {} days cannot hold {} days off",
                self.days_off.period_days, self.days_off.min_days_off_in_period
            )));
        }
        if self.extension.max_uses > 0 && self.extension.lookback_days == 0 {
            return Err(invalid(String::from(
                "extension lookback must be at least one day",
            )));
        }

        Ok(())
    }

    fn band_for(&self, report_time: Time, crew: CrewComplement) -> Option<&FdpBand> {
        self.fdp_bands
            .iter()
            .find(|band| band.crew == Some(crew) && band.covers(report_time))
            .or_else(|| {
                self.fdp_bands
                    .iter()
                    .find(|band| band.crew.is_none() && band.covers(report_time))
            })
    }

    fn base_limit(&self, report_time: Time, sectors: u32, crew: CrewComplement) -> Option<Hours> {
        self.band_for(report_time, crew)?.limit_for(sectors)
    }
}

impl Default for RuleTable {
    /// An illustrative table shaped after EASA ORO.FTL for acclimatised crew.
    ///
    /// Operators must replace it with the scheme approved by their authority.
    fn default() -> Self {
        let bands: [(Time, Time, Hours); 13] = [
            (time!(05:00), time!(05:15), Hours::from_hm(12, 0)),
            (time!(05:15), time!(05:30), Hours::from_hm(12, 15)),
            (time!(05:30), time!(05:45), Hours::from_hm(12, 30)),
            (time!(05:45), time!(06:00), Hours::from_hm(12, 45)),
            (time!(06:00), time!(13:30), Hours::from_hm(13, 0)),
            (time!(13:30), time!(14:00), Hours::from_hm(12, 45)),
            (time!(14:00), time!(14:30), Hours::from_hm(12, 30)),
            (time!(14:30), time!(15:00), Hours::from_hm(12, 15)),
            (time!(15:00), time!(15:30), Hours::from_hm(12, 0)),
            (time!(15:30), time!(16:00), Hours::from_hm(11, 45)),
            (time!(16:00), time!(16:30), Hours::from_hm(11, 30)),
            (time!(16:30), time!(17:00), Hours::from_hm(11, 15)),
            (time!(17:00), time!(05:00), Hours::from_hm(11, 0)),
        ];

        Self {
            version: String::from("easa-oro-ftl-illustrative-1"),
            fdp_bands: bands
                .iter()
                .map(|&(report_from, report_until, base)| FdpBand {
                    report_from,
                    report_until,
                    crew: None,
                    sector_ladder: sector_ladder(base),
                })
                .collect(),
            split_duty_allowance: Hours::ZERO,
            disruptive: DisruptivePolicy {
                window_start: time!(02:00),
                window_end: time!(06:00),
                max_fdp_reduction: Hours::from_hm(1, 0),
            },
            rest_boundary: RestBoundary::DutyPeriod,
            minimum_rest: MinimumRestPolicy {
                floor: Hours::from_hm(12, 0),
                preceding_duty_percent: 100,
            },
            standby: StandbyPolicy {
                credit_percent: 25,
                contiguity_tolerance: Hours::from_hm(1, 0),
                max_standby: Hours::from_hm(16, 0),
                max_standby_plus_fdp: Hours::from_hm(18, 0),
            },
            extension: ExtensionPolicy {
                max_extension: Hours::from_hm(1, 0),
                max_sectors: 5,
                allow_disruptive: false,
                max_uses: 2,
                lookback_days: 7,
            },
            days_off: DaysOffPolicy {
                max_consecutive_duty_days: 6,
                period_days: 28,
                min_days_off_in_period: 8,
            },
            cumulative: CumulativeLimits {
                duty_7d: Some(Hours::from_hm(60, 0)),
                duty_28d: Some(Hours::from_hm(190, 0)),
                flight_28d: Some(Hours::from_hm(100, 0)),
                flight_365d: Some(Hours::from_hm(1000, 0)),
                ..CumulativeLimits::default()
            },
        }
    }
}

/// Ladder with `base` for up to two sectors, 30 minutes less per extra sector,
/// never below 9 hours, up to ten sectors.
fn sector_ladder(base: Hours) -> Vec<SectorStep> {
    let floor: Hours = Hours::from_hm(9, 0);
    (2..=10)
        .map(|max_sectors: u32| {
            let reduction: Hours = Hours::from_minutes(30 * i64::from(max_sectors - 2));
            SectorStep {
                max_sectors,
                max_fdp: base.saturating_sub(reduction).max(floor),
            }
        })
        .collect()
}
