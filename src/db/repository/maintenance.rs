use rusqlite::Connection;

use crate::db::DatabaseError;

/// Tables cleared before a seeding run, children first.
pub const ANALYTICS_TABLES: [&str; 5] = [
    "goal_progress_snapshots",
    "payments",
    "appointments",
    "patient_visits",
    "performance_goals",
];

/// Empties every analytics table and resets their id sequences.
///
/// Patients, services and users are left alone.
pub fn truncate_analytics_tables(conn: &Connection) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    for table in ANALYTICS_TABLES {
        tx.execute(&format!("DELETE FROM {table}"), [])?;
        tx.execute("DELETE FROM sqlite_sequence WHERE name = ?1", [table])?;
    }
    tx.commit()?;
    tracing::info!(tables = ANALYTICS_TABLES.len(), "Cleared analytics tables");
    Ok(())
}
