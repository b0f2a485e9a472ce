use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::enums::GoalStatus;
use crate::models::{DateRange, GoalProgressSnapshot, NewGoal, PerformanceGoal, DATE_FORMAT};

const GOAL_SELECT: &str = "SELECT id, period_type, period_start, period_end, metric, target_value,
        status, service_id, package_promo_id, created_by
 FROM performance_goals";

type GoalRow = (
    i64,
    String,
    NaiveDate,
    Option<NaiveDate>,
    String,
    f64,
    String,
    Option<i64>,
    Option<i64>,
    Option<i64>,
);

fn read_goal_row(row: &Row<'_>) -> rusqlite::Result<GoalRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
    ))
}

fn goal_from_row(row: GoalRow) -> Result<PerformanceGoal, DatabaseError> {
    let (id, period_type, period_start, period_end, metric, target_value, status, service_id, package_promo_id, created_by) =
        row;
    Ok(PerformanceGoal {
        id,
        period_type: period_type.parse()?,
        period_start,
        period_end,
        metric,
        target_value,
        status: status.parse()?,
        service_id,
        package_promo_id,
        created_by,
    })
}

pub fn insert_goal(conn: &Connection, goal: &NewGoal) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO performance_goals (period_type, period_start, period_end, metric,
         target_value, status, service_id, package_promo_id, created_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            goal.period_type.as_str(),
            goal.period_start.format(DATE_FORMAT).to_string(),
            goal.period_end.map(|d| d.format(DATE_FORMAT).to_string()),
            goal.metric.as_str(),
            goal.target_value,
            goal.status.as_str(),
            goal.service_id,
            goal.package_promo_id,
            goal.created_by,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_goal(conn: &Connection, id: i64) -> Result<Option<PerformanceGoal>, DatabaseError> {
    let row = conn
        .query_row(&format!("{GOAL_SELECT} WHERE id = ?1"), params![id], read_goal_row)
        .optional()?;
    row.map(goal_from_row).transpose()
}

pub fn list_goals(conn: &Connection) -> Result<Vec<PerformanceGoal>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{GOAL_SELECT} ORDER BY period_start, id"))?;
    let rows = stmt.query_map([], read_goal_row)?;
    let mut goals = Vec::new();
    for row in rows {
        goals.push(goal_from_row(row?)?);
    }
    Ok(goals)
}

/// Goals whose period shares at least one day with `range`.
pub fn list_goals_overlapping(
    conn: &Connection,
    range: &DateRange,
) -> Result<Vec<PerformanceGoal>, DatabaseError> {
    // The stored columns cannot express month-goal ends, so overlap is
    // decided on the derived period.
    Ok(list_goals(conn)?
        .into_iter()
        .filter(|goal| goal.period().intersect(range).is_some())
        .collect())
}

pub fn update_goal_status(
    conn: &Connection,
    goal_id: i64,
    status: GoalStatus,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE performance_goals SET status = ?1 WHERE id = ?2",
        params![status.as_str(), goal_id],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "PerformanceGoal".into(),
            id: goal_id.to_string(),
        });
    }
    Ok(())
}

/// Records the goal's value as of `as_of_date`, replacing any snapshot
/// already taken for that goal and date.
pub fn insert_snapshot(
    conn: &Connection,
    goal_id: i64,
    as_of_date: NaiveDate,
    actual_value: f64,
) -> Result<GoalProgressSnapshot, DatabaseError> {
    let id = conn.query_row(
        "INSERT INTO goal_progress_snapshots (goal_id, as_of_date, actual_value)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (goal_id, as_of_date) DO UPDATE SET
             actual_value = excluded.actual_value,
             created_at = datetime('now')
         RETURNING id",
        params![goal_id, as_of_date.format(DATE_FORMAT).to_string(), actual_value],
        |row| row.get(0),
    )?;
    Ok(GoalProgressSnapshot {
        id,
        goal_id,
        as_of_date,
        actual_value,
    })
}

pub fn list_snapshots(
    conn: &Connection,
    goal_id: i64,
) -> Result<Vec<GoalProgressSnapshot>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, goal_id, as_of_date, actual_value
         FROM goal_progress_snapshots
         WHERE goal_id = ?1
         ORDER BY as_of_date, id",
    )?;
    let rows = stmt.query_map(params![goal_id], |row| {
        Ok(GoalProgressSnapshot {
            id: row.get(0)?,
            goal_id: row.get(1)?,
            as_of_date: row.get(2)?,
            actual_value: row.get(3)?,
        })
    })?;
    let mut snapshots = Vec::new();
    for row in rows {
        snapshots.push(row?);
    }
    Ok(snapshots)
}

/// Most recent snapshot of a goal (latest `as_of_date`, then latest id).
pub fn latest_snapshot(
    conn: &Connection,
    goal_id: i64,
) -> Result<Option<GoalProgressSnapshot>, DatabaseError> {
    let snapshot = conn
        .query_row(
            "SELECT id, goal_id, as_of_date, actual_value
             FROM goal_progress_snapshots
             WHERE goal_id = ?1
             ORDER BY as_of_date DESC, id DESC
             LIMIT 1",
            params![goal_id],
            |row| {
                Ok(GoalProgressSnapshot {
                    id: row.get(0)?,
                    goal_id: row.get(1)?,
                    as_of_date: row.get(2)?,
                    actual_value: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::{GoalMetric, PeriodType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn promo(start: NaiveDate, end: NaiveDate) -> NewGoal {
        NewGoal {
            period_type: PeriodType::Promo,
            period_start: start,
            period_end: Some(end),
            metric: GoalMetric::TotalVisits,
            target_value: 50.0,
            status: GoalStatus::Active,
            service_id: None,
            package_promo_id: None,
            created_by: None,
        }
    }

    #[test]
    fn goal_insert_and_retrieve() {
        let conn = open_memory_database().unwrap();
        let id = insert_goal(&conn, &promo(date(2025, 3, 15), date(2025, 4, 15))).unwrap();
        let goal = get_goal(&conn, id).unwrap().unwrap();
        assert_eq!(goal.period_type, PeriodType::Promo);
        assert_eq!(goal.metric_kind(), Some(GoalMetric::TotalVisits));
        assert_eq!(goal.period_end, Some(date(2025, 4, 15)));
        assert!(get_goal(&conn, id + 1).unwrap().is_none());
    }

    #[test]
    fn unknown_metric_is_loaded_not_rejected() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO performance_goals (period_type, period_start, metric, target_value)
             VALUES ('month', '2025-01-01', 'patient_satisfaction', 90)",
            [],
        )
        .unwrap();
        let goals = list_goals(&conn).unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].metric_kind(), None);
    }

    #[test]
    fn overlapping_goals_use_derived_period() {
        let conn = open_memory_database().unwrap();
        insert_goal(&conn, &NewGoal::monthly(date(2025, 2, 10), GoalMetric::Revenue, 1000.0))
            .unwrap();
        insert_goal(&conn, &promo(date(2025, 3, 20), date(2025, 4, 5))).unwrap();

        let march = DateRange::month_of(date(2025, 3, 1));
        let found = list_goals_overlapping(&conn, &march).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].period_type, PeriodType::Promo);

        let feb = DateRange::month_of(date(2025, 2, 1));
        assert_eq!(list_goals_overlapping(&conn, &feb).unwrap().len(), 1);
    }

    #[test]
    fn latest_snapshot_prefers_latest_date() {
        let conn = open_memory_database().unwrap();
        let id = insert_goal(&conn, &promo(date(2025, 1, 1), date(2025, 3, 31))).unwrap();
        insert_snapshot(&conn, id, date(2025, 2, 28), 20.0).unwrap();
        insert_snapshot(&conn, id, date(2025, 1, 31), 10.0).unwrap();

        let latest = latest_snapshot(&conn, id).unwrap().unwrap();
        assert_eq!(latest.as_of_date, date(2025, 2, 28));
        assert_eq!(latest.actual_value, 20.0);
        assert_eq!(list_snapshots(&conn, id).unwrap().len(), 2);
    }

    #[test]
    fn update_status_of_missing_goal_is_not_found() {
        let conn = open_memory_database().unwrap();
        let result = update_goal_status(&conn, 42, GoalStatus::Done);
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn snapshot_for_same_date_is_replaced() {
        let conn = open_memory_database().unwrap();
        let id = insert_goal(&conn, &promo(date(2025, 1, 1), date(2025, 1, 31))).unwrap();
        let first = insert_snapshot(&conn, id, date(2025, 1, 31), 10.0).unwrap();
        let second = insert_snapshot(&conn, id, date(2025, 1, 31), 12.0).unwrap();

        assert_eq!(first.id, second.id);
        let snapshots = list_snapshots(&conn, id).unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].actual_value, 12.0);
    }
}
