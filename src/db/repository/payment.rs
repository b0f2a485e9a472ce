use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::Connection;

use super::{insert_rows, text_or_null};
use crate::db::DatabaseError;
use crate::models::enums::VisitStatus;
use crate::models::{Payment, PaymentDraft, DATETIME_FORMAT};

const STAGED_PAYMENT_COLUMNS: [&str; 9] = [
    "visit_token",
    "currency",
    "amount_due",
    "amount_paid",
    "method",
    "status",
    "reference_no",
    "paid_at",
    "created_by",
];

/// Writes payment drafts and links each one to the visit carrying its
/// correlation token.
///
/// Drafts are staged in a temporary table and resolved to visit ids with a
/// single join. Only completed visits can receive a payment; a draft whose
/// token matches no completed visit aborts with `ConstraintViolation`, so
/// callers should run this inside the transaction that inserted the visits.
pub fn insert_linked_payments(
    conn: &Connection,
    drafts: &[PaymentDraft],
    chunk_size: usize,
) -> Result<usize, DatabaseError> {
    if drafts.is_empty() {
        return Ok(0);
    }

    conn.execute_batch(
        "CREATE TEMP TABLE IF NOT EXISTS staged_payments (
             visit_token TEXT NOT NULL UNIQUE,
             currency TEXT NOT NULL,
             amount_due REAL NOT NULL,
             amount_paid REAL NOT NULL,
             method TEXT NOT NULL,
             status TEXT NOT NULL,
             reference_no TEXT NOT NULL,
             paid_at TEXT,
             created_by INTEGER
         );
         DELETE FROM staged_payments;",
    )?;

    let rows: Vec<Vec<Value>> = drafts
        .iter()
        .map(|d| {
            vec![
                Value::Text(d.visit_token.clone()),
                Value::Text(d.currency.clone()),
                Value::Real(d.amount_due),
                Value::Real(d.amount_paid),
                Value::Text(d.method.as_str().into()),
                Value::Text(d.status.as_str().into()),
                Value::Text(d.reference_no.clone()),
                text_or_null(d.paid_at.map(|t| t.format(DATETIME_FORMAT).to_string())),
                d.created_by.map(Value::Integer).unwrap_or(Value::Null),
            ]
        })
        .collect();
    let staged = insert_rows(conn, "staged_payments", &STAGED_PAYMENT_COLUMNS, &rows, chunk_size)?;

    let linked = conn.execute(
        "INSERT INTO payments (patient_visit_id, currency, amount_due, amount_paid, method,
                               status, reference_no, paid_at, created_by)
         SELECT v.id, s.currency, s.amount_due, s.amount_paid, s.method,
                s.status, s.reference_no, s.paid_at, s.created_by
         FROM staged_payments s
         JOIN patient_visits v ON v.correlation_token = s.visit_token
         WHERE v.status = ?1
         ORDER BY v.id",
        [VisitStatus::Completed.as_str()],
    )?;
    conn.execute("DELETE FROM staged_payments", [])?;

    if linked != staged {
        return Err(DatabaseError::ConstraintViolation(format!(
            "{} of {staged} payment drafts have no completed visit to settle",
            staged - linked
        )));
    }
    Ok(linked)
}

/// All payments settling a visit, ordered by id.
pub fn list_visit_payments(conn: &Connection) -> Result<Vec<Payment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, appointment_id, patient_visit_id, currency, amount_due, amount_paid,
                method, status, reference_no, paid_at, created_by
         FROM payments
         WHERE patient_visit_id IS NOT NULL
         ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, Option<i64>>(1)?,
            row.get::<_, Option<i64>>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, f64>(4)?,
            row.get::<_, f64>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, String>(7)?,
            row.get::<_, String>(8)?,
            row.get::<_, Option<NaiveDateTime>>(9)?,
            row.get::<_, Option<i64>>(10)?,
        ))
    })?;

    let mut payments = Vec::new();
    for row in rows {
        let (id, appointment_id, visit_id, currency, due, paid, method, status, reference_no, paid_at, created_by) =
            row?;
        payments.push(Payment {
            id,
            appointment_id,
            patient_visit_id: visit_id,
            currency,
            amount_due: due,
            amount_paid: paid,
            method: method.parse()?,
            status: status.parse()?,
            reference_no,
            paid_at,
            created_by,
        });
    }
    Ok(payments)
}
