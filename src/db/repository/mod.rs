//! Repository layer: entity-scoped database operations.
//!
//! Every function takes the connection explicitly. Aggregates used by goal
//! evaluation live in `analytics`; bulk loading helpers used by the seeder
//! live next to the entity they write.

mod analytics;
mod appointment;
mod goal;
mod maintenance;
mod patient;
mod payment;
mod service;
mod user;
mod visit;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use super::DatabaseError;

/// Upper bound on rows per multi-row INSERT statement.
pub const MAX_INSERT_CHUNK: usize = 1000;

// Re-export all public items from sub-modules
pub use analytics::*;
pub use appointment::*;
pub use goal::*;
pub use maintenance::*;
pub use patient::*;
pub use payment::*;
pub use service::*;
pub use user::*;
pub use visit::*;

/// Inserts `rows` into `table` using one multi-row statement per chunk.
///
/// Each row must hold exactly one value per column. Returns the number of
/// inserted rows.
pub(crate) fn insert_rows(
    conn: &Connection,
    table: &str,
    columns: &[&str],
    rows: &[Vec<Value>],
    chunk_size: usize,
) -> Result<usize, DatabaseError> {
    if let Some(bad) = rows.iter().find(|row| row.len() != columns.len()) {
        return Err(DatabaseError::ConstraintViolation(format!(
            "{table}: row has {} values for {} columns",
            bad.len(),
            columns.len()
        )));
    }

    let chunk_size = chunk_size.clamp(1, MAX_INSERT_CHUNK);
    let row_placeholder = format!("({})", vec!["?"; columns.len()].join(", "));
    let column_list = columns.join(", ");

    let mut inserted = 0;
    for chunk in rows.chunks(chunk_size) {
        let sql = format!(
            "INSERT INTO {table} ({column_list}) VALUES {}",
            vec![row_placeholder.as_str(); chunk.len()].join(", ")
        );
        inserted += conn.execute(&sql, params_from_iter(chunk.iter().flatten()))?;
        tracing::debug!(table, rows = chunk.len(), "Inserted chunk");
    }
    Ok(inserted)
}

fn text_or_null(value: Option<String>) -> Value {
    value.map(Value::Text).unwrap_or(Value::Null)
}
