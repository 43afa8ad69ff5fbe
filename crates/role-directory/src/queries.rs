//! Standalone query functions that work with any Connection.
//!
//! Each function takes a `&Connection` (a `Transaction` derefs to one), and
//! expects already-normalized names. This is the storage boundary: SQLite
//! constraint failures are translated into [`DirectoryError`] variants here
//! and nowhere else.

use crate::{DirectoryError, DirectoryResult, Role, User};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

// ==========================================
// Roles
// ==========================================

/// Insert a new role. A duplicate name yields [`DirectoryError::AlreadyExists`].
pub fn insert_role(conn: &Connection, name: &str) -> DirectoryResult<Role> {
    let now = Utc::now().to_rfc3339();
    let inserted = conn.execute(
        "INSERT INTO roles (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
        params![name, now],
    );

    match inserted {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(DirectoryError::AlreadyExists {
                role: name.to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    }

    get_role(conn, name)?.ok_or_else(|| DirectoryError::RoleNotFound {
        role: name.to_string(),
    })
}

/// Get a role by name.
pub fn get_role(conn: &Connection, name: &str) -> DirectoryResult<Option<Role>> {
    let mut stmt =
        conn.prepare_cached("SELECT id, name, created_at FROM roles WHERE name = ?1")?;

    let role = stmt
        .query_row(params![name], |row| {
            Ok(Role {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: parse_datetime(row.get::<_, String>(2)?),
            })
        })
        .optional()?;

    Ok(role)
}

/// Delete a role by name. Its memberships go with it through the cascade.
pub fn delete_role(conn: &Connection, name: &str) -> DirectoryResult<bool> {
    let count = conn.execute("DELETE FROM roles WHERE name = ?1", params![name])?;
    Ok(count > 0)
}

/// List every role name in lexicographic order.
pub fn list_role_names(conn: &Connection) -> DirectoryResult<Vec<String>> {
    let mut stmt = conn.prepare_cached("SELECT name FROM roles ORDER BY name")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}

// ==========================================
// Users
// ==========================================

/// Create the user if absent and return its id.
pub fn upsert_user(conn: &Connection, name: &str) -> DirectoryResult<i64> {
    let now = Utc::now().to_rfc3339();
    let created = conn.execute(
        "INSERT OR IGNORE INTO users (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
        params![name, now],
    )?;
    if created > 0 {
        debug!(user = %name, "User created");
    }

    let id = conn.query_row(
        "SELECT id FROM users WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(id)
}

/// Get a user by handle.
pub fn get_user(conn: &Connection, name: &str) -> DirectoryResult<Option<User>> {
    let mut stmt = conn
        .prepare_cached("SELECT id, name, telegram_id, created_at FROM users WHERE name = ?1")?;

    let user = stmt
        .query_row(params![name], |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                telegram_id: row.get(2)?,
                created_at: parse_datetime(row.get::<_, String>(3)?),
            })
        })
        .optional()?;

    Ok(user)
}

// ==========================================
// Memberships
// ==========================================

/// Insert a membership edge. Returns false when the edge already existed.
pub fn insert_membership(conn: &Connection, role_id: i64, user_id: i64) -> DirectoryResult<bool> {
    let now = Utc::now().to_rfc3339();
    let count = conn.execute(
        "INSERT OR IGNORE INTO role_users (role_id, user_id, created_at) VALUES (?1, ?2, ?3)",
        params![role_id, user_id, now],
    )?;
    Ok(count > 0)
}

/// Delete the edge between a role and a user, both addressed by name.
pub fn delete_membership(conn: &Connection, role: &str, user: &str) -> DirectoryResult<bool> {
    let count = conn.execute(
        "DELETE FROM role_users
         WHERE role_id = (SELECT id FROM roles WHERE name = ?1)
           AND user_id = (SELECT id FROM users WHERE name = ?2)",
        params![role, user],
    )?;
    Ok(count > 0)
}

/// Member handles of a role in lexicographic order. Unknown roles have no members.
pub fn list_role_members(conn: &Connection, role: &str) -> DirectoryResult<Vec<String>> {
    let mut stmt = conn.prepare_cached(
        "SELECT u.name
         FROM users u
         JOIN role_users ru ON u.id = ru.user_id
         JOIN roles r ON r.id = ru.role_id
         WHERE r.name = ?1
         ORDER BY u.name",
    )?;

    let members = stmt
        .query_map(params![role], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(members)
}

/// Number of membership edges attached to a role.
pub fn count_role_members(conn: &Connection, role_id: i64) -> DirectoryResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM role_users WHERE role_id = ?1",
        params![role_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

// ==========================================
// Helpers
// ==========================================

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(err, _) => {
            err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.and_utc())
        })
        .unwrap_or_else(|_| Utc::now())
}
