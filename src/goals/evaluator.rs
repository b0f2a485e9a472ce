//! Goal progress evaluation: aggregates clinic records into snapshot values.

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::repository::{
    count_completed_service_visits, count_visits_with_status, insert_snapshot,
    list_goals, list_goals_overlapping, sum_paid_visit_revenue, tally_appointments,
    update_goal_status, AppointmentTally,
};
use crate::db::DatabaseError;
use crate::models::enums::{GoalMetric, GoalStatus, VisitStatus};
use crate::models::{DateRange, GoalProgressSnapshot, PerformanceGoal};

/// `round(100 · completed / non_cancelled)`, or 0 without any
/// non-cancelled appointment.
pub fn completion_rate(tally: AppointmentTally) -> f64 {
    if tally.non_cancelled <= 0 {
        return 0.0;
    }
    (100.0 * tally.completed as f64 / tally.non_cancelled as f64).round()
}

/// Actual value of `goal`'s metric over `period`.
///
/// Metrics this crate does not know, and availment goals without the
/// service they track, evaluate to 0.
pub fn compute_actual_value(
    conn: &Connection,
    goal: &PerformanceGoal,
    period: &DateRange,
) -> Result<f64, DatabaseError> {
    let Some(metric) = goal.metric_kind() else {
        tracing::debug!(goal_id = goal.id, metric = %goal.metric, "Unknown metric, reporting 0");
        return Ok(0.0);
    };

    let value = match metric {
        GoalMetric::TotalVisits => {
            count_visits_with_status(conn, period, VisitStatus::Completed)? as f64
        }
        GoalMetric::Revenue => sum_paid_visit_revenue(conn, period)?,
        GoalMetric::AppointmentCompletionRate => completion_rate(tally_appointments(conn, period)?),
        GoalMetric::ServiceAvailment => match goal.service_id {
            Some(service_id) => count_completed_service_visits(conn, period, service_id)? as f64,
            None => 0.0,
        },
        GoalMetric::PackagePromoAvailment => match goal.package_promo_id {
            Some(package_id) => count_completed_service_visits(conn, period, package_id)? as f64,
            None => 0.0,
        },
    };
    Ok(value.max(0.0))
}

/// Writes one snapshot per goal per month of `range` the goal is active in.
///
/// A snapshot is dated at the end of the month, or at the end of the goal's
/// period when that comes first, and holds the value accumulated from the
/// start of the goal's period up to that date.
pub fn snapshot_goals(
    conn: &Connection,
    range: &DateRange,
) -> Result<Vec<GoalProgressSnapshot>, DatabaseError> {
    let mut snapshots = Vec::new();
    for month in range.months() {
        for goal in list_goals_overlapping(conn, &month)? {
            let goal_period = goal.period();
            let Some(overlap) = goal_period.intersect(&month) else {
                continue;
            };
            let to_date = DateRange {
                start: goal_period.start,
                end: overlap.end,
            };
            let actual = compute_actual_value(conn, &goal, &to_date)?;
            snapshots.push(insert_snapshot(conn, goal.id, overlap.end, actual)?);
        }
        tracing::debug!(month = %month.start.format("%Y-%m"), "Goal snapshots written");
    }
    tracing::info!(snapshots = snapshots.len(), "Goal progress snapshots generated");
    Ok(snapshots)
}

/// Closes active goals whose period ended before `today`: `done` when the
/// value over the whole period reached the target, `missed` otherwise.
/// Returns the number of goals settled.
/// Snapshots are not consulted; a goal need not have been evaluated first.
pub fn settle_goal_statuses(conn: &Connection, today: NaiveDate) -> Result<usize, DatabaseError> {
    let mut settled = 0;
    for goal in list_goals(conn)? {
        let period = goal.period();
        if goal.status != GoalStatus::Active || period.end >= today {
            continue;
        }
        let actual = compute_actual_value(conn, &goal, &period)?;
        let status = if actual >= goal.target_value {
            GoalStatus::Done
        } else {
            GoalStatus::Missed
        };
        update_goal_status(conn, goal.id, status)?;
        tracing::debug!(goal_id = goal.id, actual, target = goal.target_value, status = %status, "Goal settled");
        settled += 1;
    }
    Ok(settled)
}
