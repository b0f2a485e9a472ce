use rusqlite::types::Value;
use rusqlite::{params, Connection};

use super::{insert_rows, text_or_null};
use crate::db::DatabaseError;
use crate::models::{NewPatient, DATE_FORMAT};

const PATIENT_COLUMNS: [&str; 8] = [
    "first_name",
    "last_name",
    "middle_name",
    "birthdate",
    "sex",
    "contact_number",
    "address",
    "is_linked",
];

/// Bulk-inserts patients. Returns the number of rows written.
pub fn insert_patients(
    conn: &Connection,
    patients: &[NewPatient],
    chunk_size: usize,
) -> Result<usize, DatabaseError> {
    let rows: Vec<Vec<Value>> = patients
        .iter()
        .map(|p| {
            vec![
                Value::Text(p.first_name.clone()),
                Value::Text(p.last_name.clone()),
                text_or_null(p.middle_name.clone()),
                text_or_null(p.birthdate.map(|d| d.format(DATE_FORMAT).to_string())),
                text_or_null(p.sex.map(|s| s.as_str().to_string())),
                text_or_null(p.contact_number.clone()),
                text_or_null(p.address.clone()),
                Value::Integer(p.is_linked as i64),
            ]
        })
        .collect();
    insert_rows(conn, "patients", &PATIENT_COLUMNS, &rows, chunk_size)
}

pub fn count_patients(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    Ok(count)
}

pub fn list_patient_ids(conn: &Connection) -> Result<Vec<i64>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id FROM patients ORDER BY id")?;
    let rows = stmt.query_map(params![], |row| row.get::<_, i64>(0))?;
    let mut ids = Vec::new();
    for row in rows {
        ids.push(row?);
    }
    Ok(ids)
}
