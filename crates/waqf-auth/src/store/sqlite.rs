use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::Connection;

use super::RoleStore;
use crate::error::AuthError;
use crate::roles::AppRole;
use crate::types::*;

pub struct SqliteRoleStore {
    conn: Mutex<Connection>,
}

impl SqliteRoleStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: &str) -> Result<Self, AuthError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(Self::new(conn))
    }

    pub fn open_in_memory() -> Result<Self, AuthError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self::new(conn))
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, AuthError> {
        self.conn
            .lock()
            .map_err(|_| AuthError::Internal("role store lock poisoned".into()))
    }
}

const MIGRATE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS waqf_users (
    id TEXT PRIMARY KEY,
    email TEXT UNIQUE NOT NULL,
    full_name TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS waqf_user_roles (
    user_id TEXT NOT NULL REFERENCES waqf_users(id) ON DELETE CASCADE,
    role TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (user_id, role)
);

CREATE TABLE IF NOT EXISTS waqf_audit_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    actor_id TEXT,
    action TEXT NOT NULL,
    target TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const USER_COLUMNS: &str = "id, email, full_name, is_active, created_at, updated_at";

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        is_active: row.get::<_, i32>(3)? != 0,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn not_found(what: &'static str) -> impl Fn(rusqlite::Error) -> AuthError {
    move |e| match e {
        rusqlite::Error::QueryReturnedNoRows => AuthError::NotFound(format!("{what} not found")),
        _ => AuthError::Database(e.to_string()),
    }
}

/// Parse a stored role name. Unknown names are skipped so a newer backend
/// role never locks a user out of the roles this build understands.
fn parse_stored_role(user_id: &str, raw: &str) -> Option<AppRole> {
    match raw.parse() {
        Ok(role) => Some(role),
        Err(_) => {
            tracing::warn!(user_id, role = raw, "ignoring unknown stored role");
            None
        }
    }
}

#[async_trait]
impl RoleStore for SqliteRoleStore {
    async fn migrate(&self) -> Result<(), AuthError> {
        let conn = self.conn()?;
        conn.execute_batch(MIGRATE_SQL)?;
        Ok(())
    }

    // --- Users ---

    async fn create_user(&self, req: &CreateUserRequest) -> Result<User, AuthError> {
        let email = req.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::InvalidInput(format!("invalid email '{email}'")));
        }
        let id = {
            let conn = self.conn()?;
            let id = uuid::Uuid::now_v7().to_string();
            conn.execute(
                "INSERT INTO waqf_users (id, email, full_name) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, email, req.full_name],
            )
            .map_err(|e| {
                if let rusqlite::Error::SqliteFailure(ref err, _) = e {
                    if err.extended_code == 2067 {
                        return AuthError::Duplicate(format!("user '{email}' already exists"));
                    }
                }
                AuthError::Database(e.to_string())
            })?;
            id
        };
        self.get_user(&id).await
    }

    async fn get_user(&self, id: &str) -> Result<User, AuthError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM waqf_users WHERE id = ?1"),
            [id],
            user_from_row,
        )
        .map_err(not_found("user"))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, AuthError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM waqf_users WHERE email = ?1"),
            [email.trim()],
            user_from_row,
        )
        .map_err(not_found("user"))
    }

    async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM waqf_users ORDER BY created_at, email"
        ))?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    async fn update_user(&self, id: &str, req: &UpdateUserRequest) -> Result<User, AuthError> {
        {
            let conn = self.conn()?;
            if let Some(ref name) = req.full_name {
                conn.execute(
                    "UPDATE waqf_users SET full_name = ?1, updated_at = datetime('now') WHERE id = ?2",
                    rusqlite::params![name, id],
                )?;
            }
            if let Some(active) = req.is_active {
                conn.execute(
                    "UPDATE waqf_users SET is_active = ?1, updated_at = datetime('now') WHERE id = ?2",
                    rusqlite::params![active as i32, id],
                )?;
            }
        }
        self.get_user(id).await
    }

    async fn delete_user(&self, id: &str) -> Result<(), AuthError> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM waqf_users WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(AuthError::NotFound("user not found".into()));
        }
        Ok(())
    }

    // --- User-Role ---

    async fn assign_role(&self, user_id: &str, role: AppRole) -> Result<(), AuthError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO waqf_user_roles (user_id, role) VALUES (?1, ?2)",
            rusqlite::params![user_id, role.as_str()],
        )
        .map_err(|e| {
            if let rusqlite::Error::SqliteFailure(ref err, _) = e {
                // SQLITE_CONSTRAINT_FOREIGNKEY
                if err.extended_code == 787 {
                    return AuthError::NotFound("user not found".into());
                }
            }
            AuthError::Database(e.to_string())
        })?;
        Ok(())
    }

    async fn revoke_role(&self, user_id: &str, role: AppRole) -> Result<(), AuthError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM waqf_user_roles WHERE user_id = ?1 AND role = ?2",
            rusqlite::params![user_id, role.as_str()],
        )?;
        if changed == 0 {
            return Err(AuthError::NotFound(format!(
                "role '{role}' not assigned to user"
            )));
        }
        Ok(())
    }

    async fn list_user_roles(&self, user_id: &str) -> Result<Vec<AppRole>, AuthError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT role FROM waqf_user_roles WHERE user_id = ?1 ORDER BY role")?;
        let raw = stmt
            .query_map([user_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let mut roles: Vec<AppRole> = raw
            .iter()
            .filter_map(|r| parse_stored_role(user_id, r))
            .collect();
        roles.sort();
        Ok(roles)
    }

    async fn list_assignments(&self) -> Result<Vec<RoleAssignment>, AuthError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, role, created_at FROM waqf_user_roles ORDER BY user_id, role",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows
            .into_iter()
            .filter_map(|(user_id, role, created_at)| {
                parse_stored_role(&user_id, &role).map(|role| RoleAssignment {
                    user_id,
                    role,
                    created_at,
                })
            })
            .collect())
    }

    // --- Audit ---

    async fn log_audit(
        &self,
        actor_id: Option<&str>,
        action: &str,
        target: Option<&str>,
    ) -> Result<(), AuthError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO waqf_audit_log (actor_id, action, target) VALUES (?1, ?2, ?3)",
            rusqlite::params![actor_id, action, target],
        )?;
        Ok(())
    }

    async fn list_audit(&self, limit: u32, offset: u32) -> Result<Vec<AuditEntry>, AuthError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, actor_id, action, target, created_at
             FROM waqf_audit_log ORDER BY id DESC LIMIT ?1 OFFSET ?2",
        )?;
        let entries = stmt
            .query_map(rusqlite::params![limit, offset], |row| {
                Ok(AuditEntry {
                    id: row.get(0)?,
                    actor_id: row.get(1)?,
                    action: row.get(2)?,
                    target: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
