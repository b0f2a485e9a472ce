use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::enums::UserRole;
use crate::models::User;

pub fn insert_user(
    conn: &Connection,
    name: &str,
    email: &str,
    role: UserRole,
) -> Result<User, DatabaseError> {
    conn.execute(
        "INSERT INTO users (name, email, role) VALUES (?1, ?2, ?3)",
        params![name, email, role.as_str()],
    )?;
    Ok(User {
        id: conn.last_insert_rowid(),
        name: name.into(),
        email: email.into(),
        role,
    })
}

/// First administrator account by id, if any exists.
pub fn find_administrator(conn: &Connection) -> Result<Option<User>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, email FROM users WHERE role = ?1 ORDER BY id LIMIT 1",
            params![UserRole::Admin.as_str()],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    Ok(row.map(|(id, name, email)| User {
        id,
        name,
        email,
        role: UserRole::Admin,
    }))
}
