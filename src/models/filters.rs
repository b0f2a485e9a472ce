use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::{AppointmentStatus, VisitStatus};
use super::DATE_FORMAT;
use crate::period;

/// Inclusive calendar range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Returns `None` when `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        Self {
            start: period::first_of_month(date),
            end: period::last_of_month(date),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn intersect(&self, other: &DateRange) -> Option<DateRange> {
        DateRange::new(self.start.max(other.start), self.end.min(other.end))
    }

    /// Number of days covered, both ends included.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Lower bound for comparisons against stored timestamps.
    pub fn start_bound(&self) -> String {
        format!("{} 00:00:00", self.start.format(DATE_FORMAT))
    }

    /// Upper bound for comparisons against stored timestamps.
    pub fn end_bound(&self) -> String {
        format!("{} 23:59:59", self.end.format(DATE_FORMAT))
    }

    /// Whole calendar months touched by this range, in order.
    pub fn months(&self) -> Vec<DateRange> {
        let mut months = Vec::new();
        let mut cursor = period::first_of_month(self.start);
        while cursor <= self.end {
            months.push(DateRange::month_of(cursor));
            match period::next_month(cursor) {
                Some(next) => cursor = next,
                None => break,
            }
        }
        months
    }
}

#[derive(Debug, Default)]
pub struct VisitFilter {
    pub range: Option<DateRange>,
    pub status: Option<VisitStatus>,
    pub service_id: Option<i64>,
}

#[derive(Debug, Default)]
pub struct AppointmentFilter {
    pub range: Option<DateRange>,
    pub status: Option<AppointmentStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_of_covers_whole_month() {
        let feb = DateRange::month_of(date(2024, 2, 17));
        assert_eq!(feb.start, date(2024, 2, 1));
        assert_eq!(feb.end, date(2024, 2, 29));
        assert_eq!(feb.num_days(), 29);
    }

    #[test]
    fn new_rejects_inverted_range() {
        assert!(DateRange::new(date(2024, 3, 2), date(2024, 3, 1)).is_none());
        assert!(DateRange::new(date(2024, 3, 1), date(2024, 3, 1)).is_some());
    }

    #[test]
    fn intersect_clips_to_overlap() {
        let promo = DateRange::new(date(2024, 3, 20), date(2024, 4, 10)).unwrap();
        let april = DateRange::month_of(date(2024, 4, 1));
        let overlap = promo.intersect(&april).unwrap();
        assert_eq!(overlap.start, date(2024, 4, 1));
        assert_eq!(overlap.end, date(2024, 4, 10));

        let june = DateRange::month_of(date(2024, 6, 1));
        assert!(promo.intersect(&june).is_none());
    }

    #[test]
    fn months_spans_year_boundary() {
        let range = DateRange::new(date(2023, 11, 15), date(2024, 2, 3)).unwrap();
        let months = range.months();
        assert_eq!(months.len(), 4);
        assert_eq!(months[0].start, date(2023, 11, 1));
        assert_eq!(months[3].end, date(2024, 2, 29));
    }

    #[test]
    fn bounds_cover_full_days() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(range.start_bound(), "2024-01-01 00:00:00");
        assert_eq!(range.end_bound(), "2024-01-31 23:59:59");
    }
}
