//! User Storage - CRUD operations for the users table
//!
//! Password hash and salt never leave this module except through
//! `credentials()`, which the login flow uses for verification. The
//! `User` record handed to the API layer is already sanitized.

use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use ulid::Ulid;

/// A user record, safe to serialize into API responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
    pub login_count: i64,
    pub is_active: bool,
    pub created_at: i64,
    pub last_login_at: Option<i64>,
}

/// Fields required to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
    pub password_hash: String,
    pub password_salt: String,
}

/// Updatable user fields; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub display_name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// CRUD operations for the users table
pub struct UserStore {
    conn: Arc<Mutex<Connection>>,
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        display_name: row.get(2)?,
        role: row.get(3)?,
        login_count: row.get(4)?,
        is_active: row.get::<_, i64>(5)? != 0,
        created_at: row.get(6)?,
        last_login_at: row.get(7)?,
    })
}

const USER_COLUMNS: &str =
    "id, email, display_name, role, login_count, is_active, created_at, last_login_at";

impl UserStore {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Insert a new user and return the stored record.
    pub fn create(&self, new: NewUser) -> rusqlite::Result<User> {
        let id = Ulid::new().to_string();
        let now = chrono::Utc::now().timestamp();

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO users (id, email, display_name, password_hash, password_salt, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                new.email,
                new.display_name,
                new.password_hash,
                new.password_salt,
                new.role,
                now
            ],
        )?;

        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            row_to_user,
        )
    }

    /// Load a user by id.
    pub fn get(&self, id: &str) -> rusqlite::Result<Option<User>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            row_to_user,
        )
        .optional()
    }

    /// Load a user by email.
    pub fn get_by_email(&self, email: &str) -> rusqlite::Result<Option<User>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            row_to_user,
        )
        .optional()
    }

    /// Whether a user with this email already exists.
    pub fn email_exists(&self, email: &str) -> rusqlite::Result<bool> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// List all users, newest first.
    pub fn list(&self) -> rusqlite::Result<Vec<User>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map([], row_to_user)?;
        rows.collect()
    }

    /// Apply a partial update; returns the updated record.
    ///
    /// Returns `None` if the user doesn't exist.
    pub fn update(&self, id: &str, update: UserUpdate) -> rusqlite::Result<Option<User>> {
        {
            let conn = self.conn.lock();
            if let Some(display_name) = &update.display_name {
                conn.execute(
                    "UPDATE users SET display_name = ?1 WHERE id = ?2",
                    params![display_name, id],
                )?;
            }
            if let Some(role) = &update.role {
                conn.execute("UPDATE users SET role = ?1 WHERE id = ?2", params![role, id])?;
            }
            if let Some(is_active) = update.is_active {
                conn.execute(
                    "UPDATE users SET is_active = ?1 WHERE id = ?2",
                    params![is_active as i64, id],
                )?;
            }
        }
        self.get(id)
    }

    /// Delete a user; returns whether a row was removed.
    pub fn delete(&self, id: &str) -> rusqlite::Result<bool> {
        let conn = self.conn.lock();
        let changed = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Fetch the stored password hash and salt for an email.
    pub fn credentials(&self, email: &str) -> rusqlite::Result<Option<(String, String)>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT password_hash, password_salt FROM users WHERE email = ?1",
            params![email],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
    }

    /// Record a successful login: bump `login_count`, stamp `last_login_at`.
    pub fn record_login(&self, id: &str) -> rusqlite::Result<()> {
        let now = chrono::Utc::now().timestamp();
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE users SET login_count = login_count + 1, last_login_at = ?1 WHERE id = ?2",
            params![now, id],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;

    fn sample(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            display_name: Some("Test User".to_string()),
            role: "member".to_string(),
            password_hash: "hash".to_string(),
            password_salt: "salt".to_string(),
        }
    }

    #[test]
    fn test_create_and_get() {
        let db = Db::open_in_memory().unwrap();
        let store = db.users();

        let user = store.create(sample("ada@example.com")).unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.login_count, 0);
        assert!(user.is_active);
        assert!(user.last_login_at.is_none());

        let loaded = store.get(&user.id).unwrap().unwrap();
        assert_eq!(loaded, user);
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_email_uniqueness() {
        let db = Db::open_in_memory().unwrap();
        let store = db.users();

        store.create(sample("dup@example.com")).unwrap();
        assert!(store.email_exists("dup@example.com").unwrap());
        assert!(!store.email_exists("new@example.com").unwrap());

        // The UNIQUE constraint is the backstop
        assert!(store.create(sample("dup@example.com")).is_err());
    }

    #[test]
    fn test_update_partial() {
        let db = Db::open_in_memory().unwrap();
        let store = db.users();
        let user = store.create(sample("ada@example.com")).unwrap();

        let updated = store
            .update(
                &user.id,
                UserUpdate {
                    role: Some("admin".to_string()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.role, "admin");
        // Untouched fields survive
        assert_eq!(updated.display_name, user.display_name);

        assert!(store.update("nope", UserUpdate::default()).unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let db = Db::open_in_memory().unwrap();
        let store = db.users();
        let user = store.create(sample("gone@example.com")).unwrap();

        assert!(store.delete(&user.id).unwrap());
        assert!(!store.delete(&user.id).unwrap());
        assert!(store.get(&user.id).unwrap().is_none());
    }

    #[test]
    fn test_record_login() {
        let db = Db::open_in_memory().unwrap();
        let store = db.users();
        let user = store.create(sample("ada@example.com")).unwrap();

        store.record_login(&user.id).unwrap();
        store.record_login(&user.id).unwrap();

        let loaded = store.get(&user.id).unwrap().unwrap();
        assert_eq!(loaded.login_count, 2);
        assert!(loaded.last_login_at.is_some());
    }

    #[test]
    fn test_credentials_lookup() {
        let db = Db::open_in_memory().unwrap();
        let store = db.users();
        store.create(sample("ada@example.com")).unwrap();

        let (hash, salt) = store.credentials("ada@example.com").unwrap().unwrap();
        assert_eq!(hash, "hash");
        assert_eq!(salt, "salt");
        assert!(store.credentials("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first() {
        let db = Db::open_in_memory().unwrap();
        let store = db.users();
        store.create(sample("first@example.com")).unwrap();
        // ULIDs only order across millisecond boundaries
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.create(sample("second@example.com")).unwrap();

        let users = store.list().unwrap();
        assert_eq!(users.len(), 2);
        // Same created_at second is possible; ULIDs break the tie
        assert_eq!(users[0].email, "second@example.com");
    }
}
