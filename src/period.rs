//! Calendar helpers for reporting periods.
//!
//! All reporting works on whole calendar months: the seeder walks months,
//! snapshots close on the last day of a month, and month goals cover exactly
//! one month.

use chrono::{Datelike, Months, NaiveDate};

use crate::models::DateRange;

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    next_month(date)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// First day of the month after `date`.
pub fn next_month(date: NaiveDate) -> Option<NaiveDate> {
    first_of_month(date).checked_add_months(Months::new(1))
}

/// Default seeding window: the first day of the month one year before
/// `today` through the last day of the current month (13 months).
pub fn trailing_year(today: NaiveDate) -> DateRange {
    let start = today
        .checked_sub_months(Months::new(12))
        .map(first_of_month)
        .unwrap_or_else(|| first_of_month(today));
    DateRange {
        start,
        end: last_of_month(today),
    }
}

/// Parses `YYYY-MM` into the month it names.
pub fn parse_month(value: &str) -> Option<DateRange> {
    let first = NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").ok()?;
    Some(DateRange::month_of(first))
}
