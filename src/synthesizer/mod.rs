//! Analytics data synthesizer.
//!
//! A run wipes the analytics tables, tops up the patient and service pools,
//! creates the monthly goals, then drafts and persists one month of visits,
//! appointments and payments at a time before writing goal snapshots.

pub mod draw;
pub mod generator;
pub mod reference;
pub mod summary;

pub use generator::{persist_batch, BatchCounts, MonthBatch, VisitGenerator};
pub use summary::{format_currency, SeedSummary};

use chrono::NaiveDate;
use rand::Rng;
use rusqlite::Connection;
use thiserror::Error;

use crate::config::SeedConfig;
use crate::db::repository::{find_administrator, truncate_analytics_tables};
use crate::db::DatabaseError;
use crate::goals::{seed_monthly_goals, settle_goal_statuses, snapshot_goals};
use crate::models::DateRange;
use crate::period;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("No administrator account found; create an admin user before seeding")]
    MissingAdministrator,

    #[error("No {0} available to generate visits from")]
    EmptyPool(&'static str),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Parameters of one seeding run.
#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub range: DateRange,
    /// Reference date for patient ages and goal settlement.
    pub today: NaiveDate,
    pub config: SeedConfig,
}

impl SeedOptions {
    /// The thirteen months ending with the month of `today`.
    pub fn trailing_year(today: NaiveDate) -> Self {
        Self {
            range: period::trailing_year(today),
            today,
            config: SeedConfig::default(),
        }
    }
}

/// Replaces all analytics data with a freshly generated history.
pub fn seed_analytics<R: Rng>(
    conn: &Connection,
    rng: &mut R,
    options: &SeedOptions,
) -> Result<SeedSummary, SeedError> {
    let config = &options.config;
    tracing::info!(
        start = %options.range.start,
        end = %options.range.end,
        "Starting analytics data seeding"
    );

    truncate_analytics_tables(conn)?;
    let admin = find_administrator(conn)?.ok_or(SeedError::MissingAdministrator)?;

    let patients = reference::ensure_patients(
        conn,
        rng,
        config.min_patients,
        options.today,
        config.insert_chunk_size,
    )?;
    let services = reference::ensure_services(conn, config.min_services)?;

    seed_monthly_goals(conn, &admin, &options.range, config)?;

    let mut generator = VisitGenerator::new(
        rng,
        &patients,
        &services,
        admin.id,
        config.fallback_price,
        &config.currency,
    )
    .ok_or(if patients.is_empty() {
        SeedError::EmptyPool("patients")
    } else {
        SeedError::EmptyPool("services")
    })?;
    tracing::debug!(run_id = %generator.run_id(), "Visit generator ready");

    for month in options.range.months() {
        let batch = generator.generate(&month);
        let counts = persist_batch(conn, &batch, config.insert_chunk_size)?;
        tracing::info!(
            month = %month.start.format("%Y-%m"),
            visits = counts.visits,
            appointments = counts.appointments,
            payments = counts.payments,
            "Month generated"
        );
    }

    snapshot_goals(conn, &options.range)?;
    let settled = settle_goal_statuses(conn, options.today)?;
    tracing::info!(settled, "Goal statuses settled");

    let summary = SeedSummary::collect(conn, options.range)?;
    tracing::info!("Analytics data seeding completed");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{count_patients, insert_user, list_goals};
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::{GoalStatus, UserRole};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn two_months() -> SeedOptions {
        SeedOptions {
            range: DateRange::new(date(2025, 5, 1), date(2025, 6, 30)).unwrap(),
            today: date(2025, 6, 15),
            config: SeedConfig::default(),
        }
    }

    fn scalar(conn: &Connection, sql: &str) -> i64 {
        conn.query_row(sql, [], |row| row.get(0)).unwrap()
    }

    #[test]
    fn missing_admin_fails_after_truncation() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO performance_goals (period_type, period_start, metric, target_value)
             VALUES ('month', '2025-01-01', 'revenue', 10)",
            [],
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let result = seed_analytics(&conn, &mut rng, &two_months());
        assert!(matches!(result, Err(SeedError::MissingAdministrator)));
        assert_eq!(scalar(&conn, "SELECT COUNT(*) FROM performance_goals"), 0);
        assert_eq!(scalar(&conn, "SELECT COUNT(*) FROM patients"), 0);
    }

    #[test]
    fn full_run_produces_consistent_history() {
        let conn = open_memory_database().unwrap();
        insert_user(&conn, "Dr. Admin", "admin@clinic.test", UserRole::Admin).unwrap();
        let mut rng = StdRng::seed_from_u64(2025);

        let summary = seed_analytics(&conn, &mut rng, &two_months()).unwrap();

        assert_eq!(count_patients(&conn).unwrap(), 50);
        assert_eq!(scalar(&conn, "SELECT COUNT(*) FROM services"), 8);
        assert!(summary.counts.visits > 0);
        assert_eq!(summary.counts.goals, 6);
        assert_eq!(summary.counts.snapshots, 6);

        // Every appointment mirrors a visit with the mapped status.
        let unmatched = scalar(
            &conn,
            "SELECT COUNT(*) FROM appointments a
             WHERE NOT EXISTS (
                 SELECT 1 FROM patient_visits v
                 WHERE v.patient_id = a.patient_id
                   AND v.visit_date = a.date
                   AND substr(v.start_time, 12, 5) = substr(a.time_slot, 1, 5)
                   AND ((a.status = 'completed' AND v.status = 'completed')
                     OR (a.status = 'approved' AND v.status = 'pending')
                     OR (a.status = 'cancelled' AND v.status = 'rejected')))",
        );
        assert_eq!(unmatched, 0);

        // Paid payments settle completed visits in full, one per visit.
        let bad_payments = scalar(
            &conn,
            "SELECT COUNT(*) FROM payments p
             LEFT JOIN patient_visits v ON v.id = p.patient_visit_id
             WHERE p.status = 'paid'
               AND (v.id IS NULL OR v.status != 'completed' OR p.amount_paid != p.amount_due)",
        );
        assert_eq!(bad_payments, 0);
        assert_eq!(
            summary.counts.payments,
            scalar(&conn, "SELECT COUNT(*) FROM patient_visits WHERE status = 'completed'")
        );

        let resummed: f64 = conn
            .query_row(
                "SELECT COALESCE(SUM(amount_paid), 0) FROM payments WHERE status = 'paid'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!((summary.total_revenue - resummed).abs() < 1e-6);

        // May ended before the run date, June did not.
        let goals = list_goals(&conn).unwrap();
        for goal in goals {
            if goal.period_start == date(2025, 5, 1) {
                assert_ne!(goal.status, GoalStatus::Active);
            } else {
                assert_eq!(goal.status, GoalStatus::Active);
            }
        }
    }

    #[test]
    fn rerun_replaces_previous_history() {
        let conn = open_memory_database().unwrap();
        insert_user(&conn, "Dr. Admin", "admin@clinic.test", UserRole::Admin).unwrap();
        let options = two_months();

        seed_analytics(&conn, &mut StdRng::seed_from_u64(1), &options).unwrap();
        let second = seed_analytics(&conn, &mut StdRng::seed_from_u64(2), &options).unwrap();

        assert_eq!(second.counts.goals, 6);
        assert_eq!(count_patients(&conn).unwrap(), 50);
        assert_eq!(
            second.counts.visits,
            scalar(&conn, "SELECT COUNT(*) FROM patient_visits")
        );
        assert_eq!(scalar(&conn, "SELECT MIN(id) FROM performance_goals"), 1);
    }
}
