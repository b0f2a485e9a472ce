use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::Connection;

use super::{insert_rows, text_or_null};
use crate::db::DatabaseError;
use crate::models::{Appointment, AppointmentFilter, NewAppointment, DATE_FORMAT};

const APPOINTMENT_COLUMNS: [&str; 9] = [
    "patient_id",
    "service_id",
    "date",
    "time_slot",
    "reference_code",
    "status",
    "payment_method",
    "payment_status",
    "notes",
];

/// Bulk-inserts appointments in chunks. Returns the number of rows written.
pub fn insert_appointments(
    conn: &Connection,
    appointments: &[NewAppointment],
    chunk_size: usize,
) -> Result<usize, DatabaseError> {
    let rows: Vec<Vec<Value>> = appointments
        .iter()
        .map(|a| {
            vec![
                Value::Integer(a.patient_id),
                a.service_id.map(Value::Integer).unwrap_or(Value::Null),
                Value::Text(a.date.format(DATE_FORMAT).to_string()),
                Value::Text(a.time_slot.clone()),
                Value::Text(a.reference_code.clone()),
                Value::Text(a.status.as_str().into()),
                Value::Text(a.payment_method.as_str().into()),
                Value::Text(a.payment_status.as_str().into()),
                text_or_null(a.notes.clone()),
            ]
        })
        .collect();
    insert_rows(conn, "appointments", &APPOINTMENT_COLUMNS, &rows, chunk_size)
}

pub fn list_appointments(
    conn: &Connection,
    filter: &AppointmentFilter,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut sql = String::from(
        "SELECT id, patient_id, service_id, date, time_slot, reference_code,
                status, payment_method, payment_status, notes
         FROM appointments
         WHERE 1=1",
    );
    let mut params_vec: Vec<Value> = Vec::new();

    if let Some(range) = filter.range {
        sql.push_str(" AND date BETWEEN ? AND ?");
        params_vec.push(Value::Text(range.start.format(DATE_FORMAT).to_string()));
        params_vec.push(Value::Text(range.end.format(DATE_FORMAT).to_string()));
    }
    if let Some(status) = filter.status {
        sql.push_str(" AND status = ?");
        params_vec.push(Value::Text(status.as_str().into()));
    }
    sql.push_str(" ORDER BY date, id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, Option<i64>>(2)?,
            row.get::<_, NaiveDate>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, String>(7)?,
            row.get::<_, String>(8)?,
            row.get::<_, Option<String>>(9)?,
        ))
    })?;

    let mut appointments = Vec::new();
    for row in rows {
        let (id, patient_id, service_id, date, time_slot, reference_code, status, method, pay_status, notes) =
            row?;
        appointments.push(Appointment {
            id,
            patient_id,
            service_id,
            date,
            time_slot,
            reference_code,
            status: status.parse()?,
            payment_method: method.parse()?,
            payment_status: pay_status.parse()?,
            notes,
        });
    }
    Ok(appointments)
}
