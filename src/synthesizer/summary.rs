use std::fmt;

use rusqlite::Connection;
use serde::Serialize;

use crate::db::repository::{table_counts, total_paid_revenue, TableCounts};
use crate::db::DatabaseError;
use crate::models::DateRange;

/// Human-readable account of the analytics data within a period.
#[derive(Debug, Clone, Serialize)]
pub struct SeedSummary {
    pub range: DateRange,
    pub counts: TableCounts,
    pub total_revenue: f64,
}

impl SeedSummary {
    pub fn collect(conn: &Connection, range: DateRange) -> Result<Self, DatabaseError> {
        Ok(Self {
            range,
            counts: table_counts(conn, &range)?,
            total_revenue: total_paid_revenue(conn, &range)?,
        })
    }
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Analytics Data Summary ===")?;
        writeln!(f, "Period: {} to {}", self.range.start, self.range.end)?;
        writeln!(f, "Total Patient Visits: {}", self.counts.visits)?;
        writeln!(f, "Total Appointments: {}", self.counts.appointments)?;
        writeln!(f, "Total Payments: {}", self.counts.payments)?;
        writeln!(f, "Total Performance Goals: {}", self.counts.goals)?;
        writeln!(f, "Total Goal Snapshots: {}", self.counts.snapshots)?;
        write!(f, "Total Revenue: {}", format_currency(self.total_revenue))
    }
}

/// Formats an amount as pesos with thousands separators, e.g. `₱1,234.50`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}₱{grouped}.{:02}", cents % 100)
}
