use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;
use rusqlite::Connection;

use super::{insert_rows, text_or_null};
use crate::db::DatabaseError;
use crate::models::enums::VisitStatus;
use crate::models::{NewVisit, Visit, VisitFilter, DATETIME_FORMAT, DATE_FORMAT};

const VISIT_COLUMNS: [&str; 8] = [
    "patient_id",
    "service_id",
    "visit_date",
    "start_time",
    "end_time",
    "status",
    "note",
    "correlation_token",
];

/// Bulk-inserts visits in chunks. Returns the number of rows written.
pub fn insert_visits(
    conn: &Connection,
    visits: &[NewVisit],
    chunk_size: usize,
) -> Result<usize, DatabaseError> {
    let rows: Vec<Vec<Value>> = visits
        .iter()
        .map(|v| {
            vec![
                Value::Integer(v.patient_id),
                v.service_id.map(Value::Integer).unwrap_or(Value::Null),
                Value::Text(v.visit_date.format(DATE_FORMAT).to_string()),
                Value::Text(v.start_time.format(DATETIME_FORMAT).to_string()),
                text_or_null(v.end_time.map(|t| t.format(DATETIME_FORMAT).to_string())),
                Value::Text(v.status.as_str().into()),
                text_or_null(v.note.clone()),
                text_or_null(v.correlation_token.clone()),
            ]
        })
        .collect();
    insert_rows(conn, "patient_visits", &VISIT_COLUMNS, &rows, chunk_size)
}

/// Visits matching the filter, ordered by start time then id.
pub fn list_visits(conn: &Connection, filter: &VisitFilter) -> Result<Vec<Visit>, DatabaseError> {
    let mut sql = String::from(
        "SELECT id, patient_id, service_id, visit_date, start_time, end_time,
                status, note, correlation_token
         FROM patient_visits
         WHERE 1=1",
    );
    let mut params_vec: Vec<Value> = Vec::new();

    if let Some(range) = filter.range {
        sql.push_str(" AND start_time BETWEEN ? AND ?");
        params_vec.push(Value::Text(range.start_bound()));
        params_vec.push(Value::Text(range.end_bound()));
    }
    if let Some(status) = filter.status {
        sql.push_str(" AND status = ?");
        params_vec.push(Value::Text(status.as_str().into()));
    }
    if let Some(service_id) = filter.service_id {
        sql.push_str(" AND service_id = ?");
        params_vec.push(Value::Integer(service_id));
    }
    sql.push_str(" ORDER BY start_time, id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, Option<i64>>(2)?,
            row.get::<_, NaiveDate>(3)?,
            row.get::<_, NaiveDateTime>(4)?,
            row.get::<_, Option<NaiveDateTime>>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, Option<String>>(7)?,
            row.get::<_, Option<String>>(8)?,
        ))
    })?;

    let mut visits = Vec::new();
    for row in rows {
        let (id, patient_id, service_id, visit_date, start_time, end_time, status, note, token) =
            row?;
        visits.push(Visit {
            id,
            patient_id,
            service_id,
            visit_date,
            start_time,
            end_time,
            status: status.parse::<VisitStatus>()?,
            note,
            correlation_token: token,
        });
    }
    Ok(visits)
}
