//! Random draws that shape a synthetic clinic day.
//!
//! Every function takes the generator explicitly so a seeded `StdRng` gives
//! reproducible output.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::enums::{AppointmentStatus, PaymentMethod, PaymentStatus, VisitStatus};

/// Weekly closure day.
pub const CLOSED_ON: Weekday = Weekday::Sun;

pub const WEEKDAY_BASE_VISITS: u32 = 15;
pub const HIGH_SEASON_MONTHS: [u32; 4] = [3, 4, 5, 12];
pub const LOW_SEASON_MONTHS: [u32; 2] = [1, 2];
pub const HIGH_SEASON_BONUS: u32 = 5;
pub const LOW_SEASON_PENALTY: u32 = 3;
pub const SATURDAY_VISITS: (u32, u32) = (3, 8);

/// First and last hour a visit may start in.
pub const FIRST_START_HOUR: u32 = 8;
pub const LAST_START_HOUR: u32 = 17;
pub const START_MINUTES: [u32; 4] = [0, 15, 30, 45];
pub const MIN_DURATION_MINUTES: i64 = 20;
pub const MAX_DURATION_MINUTES: i64 = 120;

/// Share of visits that also get an appointment record, in percent.
pub const APPOINTMENT_SHARE: u32 = 60;

// `None` entries weight the draw toward "no note".
const VISIT_NOTES: [Option<&str>; 8] = [
    Some("Regular checkup completed"),
    Some("Treatment successful"),
    Some("Patient satisfied with service"),
    Some("Follow-up scheduled"),
    Some("Additional treatment recommended"),
    None,
    None,
    None,
];

const APPOINTMENT_NOTES: [Option<&str>; 7] = [
    Some("Patient confirmed appointment"),
    Some("Reminder sent"),
    Some("Walk-in patient"),
    Some("Emergency appointment"),
    None,
    None,
    None,
];

/// Seasonal weekday base for a calendar month (1–12).
pub fn seasonal_base(month: u32) -> u32 {
    let mut base = WEEKDAY_BASE_VISITS;
    if HIGH_SEASON_MONTHS.contains(&month) {
        base += HIGH_SEASON_BONUS;
    }
    if LOW_SEASON_MONTHS.contains(&month) {
        base -= LOW_SEASON_PENALTY;
    }
    base
}

/// Inclusive bounds of the visit count for `day`, or `None` when the
/// clinic is closed.
pub fn visit_count_bounds(day: NaiveDate) -> Option<(u32, u32)> {
    match day.weekday() {
        weekday if weekday == CLOSED_ON => None,
        Weekday::Sat => Some(SATURDAY_VISITS),
        _ => {
            let base = seasonal_base(day.month());
            Some((base - 5, base + 10))
        }
    }
}

pub fn daily_visit_count<R: Rng + ?Sized>(rng: &mut R, day: NaiveDate) -> u32 {
    match visit_count_bounds(day) {
        Some((low, high)) => rng.gen_range(low..=high),
        None => 0,
    }
}

/// A visit's time window within clinic hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeSlot {
    /// `HH:MM-HH:MM`, as shown on appointment cards.
    pub fn label(&self) -> String {
        format!(
            "{:02}:{:02}-{:02}:{:02}",
            self.start.hour(),
            self.start.minute(),
            self.end.hour(),
            self.end.minute()
        )
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

pub fn time_slot<R: Rng + ?Sized>(rng: &mut R, day: NaiveDate) -> TimeSlot {
    let hour = rng.gen_range(FIRST_START_HOUR..=LAST_START_HOUR);
    let minute = START_MINUTES.choose(rng).copied().unwrap_or(0);
    let start = day.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN));
    let duration = rng.gen_range(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES);
    TimeSlot {
        start,
        end: start + Duration::minutes(duration),
    }
}

/// 85% completed, 10% pending, 5% rejected.
pub fn visit_status<R: Rng + ?Sized>(rng: &mut R) -> VisitStatus {
    match rng.gen_range(1..=100u32) {
        1..=85 => VisitStatus::Completed,
        86..=95 => VisitStatus::Pending,
        _ => VisitStatus::Rejected,
    }
}

pub fn wants_appointment<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.gen_range(1..=100u32) <= APPOINTMENT_SHARE
}

pub fn payment_method<R: Rng + ?Sized>(rng: &mut R) -> PaymentMethod {
    PaymentMethod::ALL
        .choose(rng)
        .copied()
        .unwrap_or(PaymentMethod::Cash)
}

/// Completed appointments are paid 90% of the time; all others are unpaid.
pub fn appointment_payment_status<R: Rng + ?Sized>(
    rng: &mut R,
    status: AppointmentStatus,
) -> PaymentStatus {
    if status == AppointmentStatus::Completed && rng.gen_range(1..=100u32) <= 90 {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Unpaid
    }
}

pub fn visit_note<R: Rng + ?Sized>(rng: &mut R) -> Option<String> {
    VISIT_NOTES.choose(rng).copied().flatten().map(String::from)
}

pub fn appointment_note<R: Rng + ?Sized>(rng: &mut R) -> Option<String> {
    APPOINTMENT_NOTES.choose(rng).copied().flatten().map(String::from)
}
