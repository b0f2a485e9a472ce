//! Aggregate queries behind goal evaluation and the run summary.
//!
//! Visits belong to a period by `start_time`; appointments by `date`.

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::list_goals_overlapping;
use crate::db::DatabaseError;
use crate::models::enums::{AppointmentStatus, PaymentStatus, VisitStatus};
use crate::models::{DateRange, DATE_FORMAT};

/// Completed/non-cancelled appointment counts over a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppointmentTally {
    pub completed: i64,
    pub non_cancelled: i64,
}

/// Row counts of the analytics tables.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TableCounts {
    pub visits: i64,
    pub appointments: i64,
    pub payments: i64,
    pub goals: i64,
    pub snapshots: i64,
}

pub fn count_visits_with_status(
    conn: &Connection,
    range: &DateRange,
    status: VisitStatus,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM patient_visits
         WHERE start_time BETWEEN ?1 AND ?2 AND status = ?3",
        params![range.start_bound(), range.end_bound(), status.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Completed visits of one service within the period.
pub fn count_completed_service_visits(
    conn: &Connection,
    range: &DateRange,
    service_id: i64,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM patient_visits
         WHERE start_time BETWEEN ?1 AND ?2 AND status = ?3 AND service_id = ?4",
        params![
            range.start_bound(),
            range.end_bound(),
            VisitStatus::Completed.as_str(),
            service_id
        ],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Sum of `amount_paid` over paid payments whose visit is completed and
/// starts within the period.
pub fn sum_paid_visit_revenue(conn: &Connection, range: &DateRange) -> Result<f64, DatabaseError> {
    let total = conn.query_row(
        "SELECT COALESCE(SUM(p.amount_paid), 0.0)
         FROM payments p
         JOIN patient_visits v ON v.id = p.patient_visit_id
         WHERE p.status = ?1
           AND v.status = ?2
           AND v.start_time BETWEEN ?3 AND ?4",
        params![
            PaymentStatus::Paid.as_str(),
            VisitStatus::Completed.as_str(),
            range.start_bound(),
            range.end_bound()
        ],
        |row| row.get(0),
    )?;
    Ok(total)
}

pub fn tally_appointments(
    conn: &Connection,
    range: &DateRange,
) -> Result<AppointmentTally, DatabaseError> {
    let tally = conn.query_row(
        "SELECT COALESCE(SUM(CASE WHEN status = ?3 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status != ?4 THEN 1 ELSE 0 END), 0)
         FROM appointments
         WHERE date BETWEEN ?1 AND ?2",
        params![
            range.start.format(DATE_FORMAT).to_string(),
            range.end.format(DATE_FORMAT).to_string(),
            AppointmentStatus::Completed.as_str(),
            AppointmentStatus::Cancelled.as_str()
        ],
        |row| {
            Ok(AppointmentTally {
                completed: row.get(0)?,
                non_cancelled: row.get(1)?,
            })
        },
    )?;
    Ok(tally)
}

/// Revenue from paid payments whose visit starts within the period.
pub fn total_paid_revenue(conn: &Connection, range: &DateRange) -> Result<f64, DatabaseError> {
    let total = conn.query_row(
        "SELECT COALESCE(SUM(p.amount_paid), 0.0)
         FROM payments p
         JOIN patient_visits v ON v.id = p.patient_visit_id
         WHERE p.status = ?1 AND v.start_time BETWEEN ?2 AND ?3",
        params![PaymentStatus::Paid.as_str(), range.start_bound(), range.end_bound()],
        |row| row.get(0),
    )?;
    Ok(total)
}

/// Analytics rows belonging to the period: visits by start time,
/// appointments by date, payments through their visit, goals by overlap and
/// snapshots by `as_of_date`.
pub fn table_counts(conn: &Connection, range: &DateRange) -> Result<TableCounts, DatabaseError> {
    let start = range.start.format(DATE_FORMAT).to_string();
    let end = range.end.format(DATE_FORMAT).to_string();
    let count = |sql: &str, from: &str, to: &str| -> Result<i64, DatabaseError> {
        Ok(conn.query_row(sql, params![from, to], |row| row.get(0))?)
    };
    Ok(TableCounts {
        visits: count(
            "SELECT COUNT(*) FROM patient_visits WHERE start_time BETWEEN ?1 AND ?2",
            &range.start_bound(),
            &range.end_bound(),
        )?,
        appointments: count(
            "SELECT COUNT(*) FROM appointments WHERE date BETWEEN ?1 AND ?2",
            &start,
            &end,
        )?,
        payments: count(
            "SELECT COUNT(*) FROM payments p
             JOIN patient_visits v ON v.id = p.patient_visit_id
             WHERE v.start_time BETWEEN ?1 AND ?2",
            &range.start_bound(),
            &range.end_bound(),
        )?,
        goals: list_goals_overlapping(conn, range)?.len() as i64,
        snapshots: count(
            "SELECT COUNT(*) FROM goal_progress_snapshots WHERE as_of_date BETWEEN ?1 AND ?2",
            &start,
            &end,
        )?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use chrono::NaiveDate;

    fn month(y: i32, m: u32) -> DateRange {
        DateRange::month_of(NaiveDate::from_ymd_opt(y, m, 1).unwrap())
    }

    fn seed(conn: &Connection) {
        conn.execute_batch(
            "INSERT INTO patients (first_name, last_name) VALUES ('Ana', 'Cruz');
             INSERT INTO patient_visits (patient_id, visit_date, start_time, status) VALUES
                 (1, '2024-01-05', '2024-01-05 09:00:00', 'completed'),
                 (1, '2024-01-06', '2024-01-06 09:00:00', 'completed'),
                 (1, '2024-01-08', '2024-01-08 09:00:00', 'completed'),
                 (1, '2025-06-02', '2025-06-02 10:00:00', 'completed');
             INSERT INTO payments (patient_visit_id, amount_due, amount_paid, method, status, reference_no) VALUES
                 (1, 1000, 1000, 'cash', 'paid', 'PAY1'),
                 (2, 1000, 1000, 'cash', 'paid', 'PAY2'),
                 (3, 1000, 1000, 'cash', 'paid', 'PAY3'),
                 (4, 2500, 2500, 'maya', 'paid', 'PAY4');
             INSERT INTO appointments (patient_id, date, time_slot, reference_code, status,
                                       payment_method, payment_status) VALUES
                 (1, '2024-01-05', '09:00-09:30', 'APT1', 'completed', 'cash', 'paid');
             INSERT INTO performance_goals (period_type, period_start, metric, target_value)
                 VALUES ('month', '2024-01-01', 'total_visits', 10);
             INSERT INTO goal_progress_snapshots (goal_id, as_of_date, actual_value)
                 VALUES (1, '2024-01-31', 3);",
        )
        .unwrap();
    }

    #[test]
    fn counts_are_limited_to_the_period() {
        let conn = open_memory_database().unwrap();
        seed(&conn);

        let june = table_counts(&conn, &month(2025, 6)).unwrap();
        assert_eq!(june, TableCounts { visits: 1, appointments: 0, payments: 1, goals: 0, snapshots: 0 });

        let january = table_counts(&conn, &month(2024, 1)).unwrap();
        assert_eq!(january, TableCounts { visits: 3, appointments: 1, payments: 3, goals: 1, snapshots: 1 });
    }

    #[test]
    fn revenue_is_limited_to_the_period() {
        let conn = open_memory_database().unwrap();
        seed(&conn);
        assert_eq!(total_paid_revenue(&conn, &month(2025, 6)).unwrap(), 2500.0);
        assert_eq!(total_paid_revenue(&conn, &month(2024, 1)).unwrap(), 3000.0);
        assert_eq!(total_paid_revenue(&conn, &month(2024, 2)).unwrap(), 0.0);
    }
}
