// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crew_ftl_domain::clock::{add_days, month_days};
use crew_ftl_domain::{CrewRole, DutyDayInput, PilotProfile};
use time::{Date, Month};

pub fn create_test_profile() -> PilotProfile {
    PilotProfile::new(["A320", "A321"], CrewRole::Captain)
}

/// A full month of empty records (neither duty nor day off).
pub fn create_empty_month(year: i32, month: Month) -> Vec<DutyDayInput> {
    let first: Date = Date::from_calendar_date(year, month, 1).unwrap();
    let length: u8 = month_days(year, month).unwrap();
    (0..i64::from(length))
        .map(|offset| DutyDayInput::new(add_days(first, offset).unwrap()))
        .collect()
}

/// A two-pilot A320 duty where duty and FDP coincide.
pub fn create_duty(date: Date, start: &str, end: &str, sectors: i32) -> DutyDayInput {
    let mut input: DutyDayInput = DutyDayInput::new(date);
    set_duty(&mut input, start, end, sectors);
    input
}

/// Turns an existing record into a two-pilot A320 duty.
pub fn set_duty(input: &mut DutyDayInput, start: &str, end: &str, sectors: i32) {
    input.duty_start = Some(start.to_string());
    input.duty_end = Some(end.to_string());
    input.fdp_start = Some(start.to_string());
    input.fdp_end = Some(end.to_string());
    input.sectors = Some(sectors);
    input.is_two_pilot_operation = true;
    input.is_day_off = false;
    input
        .flight_hours_by_aircraft
        .insert(String::from("A320"), f64::from(sectors) * 1.5);
}

/// Every day in `[from, until)` as a day off.
pub fn create_days_off(from: Date, until: Date) -> Vec<DutyDayInput> {
    let mut days: Vec<DutyDayInput> = Vec::new();
    let mut date: Date = from;
    while date < until {
        days.push(DutyDayInput::day_off(date));
        date = date.next_day().unwrap();
    }
    days
}

/// A realistic month: a 5-on/2-off pattern of morning duties with some
/// variety in sectors, standby and split duty.
pub fn create_busy_month(year: i32, month: Month) -> Vec<DutyDayInput> {
    let mut days: Vec<DutyDayInput> = create_empty_month(year, month);
    for (idx, day) in days.iter_mut().enumerate() {
        match idx % 7 {
            5 | 6 => day.is_day_off = true,
            0 => set_duty(day, "06:00", "14:30", 4),
            1 => {
                set_duty(day, "07:00", "17:00", 2);
                day.standby_on = Some(String::from("04:00"));
                day.standby_off = Some(String::from("06:30"));
            }
            2 => {
                set_duty(day, "06:30", "19:00", 4);
                day.is_split_duty = true;
                day.break_start = Some(String::from("11:00"));
                day.break_end = Some(String::from("13:00"));
            }
            3 => set_duty(day, "08:00", "16:00", 2),
            _ => set_duty(day, "09:00", "18:00", 3),
        }
    }
    days
}
