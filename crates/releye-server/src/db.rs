//! SQLite persistence for the API server
//!
//! Parameterized CRUD over three tables: `users`, `invites`, and
//! `activity_log`. One connection is shared behind a mutex; every store
//! method takes and releases the lock within the call, so handlers never
//! hold it across an await point.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::info;

use crate::error::ServerError;

// Submodules
mod activity;
mod invites;
mod users;

pub use activity::{ActivityEntry, ActivityStore};
pub use invites::{Invite, InviteStore, NewInvite};
pub use users::{NewUser, User, UserStore, UserUpdate};

/// Schema applied to fresh databases; every statement is idempotent.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    display_name  TEXT,
    password_hash TEXT NOT NULL,
    password_salt TEXT NOT NULL,
    role          TEXT NOT NULL DEFAULT 'member',
    login_count   INTEGER NOT NULL DEFAULT 0,
    is_active     INTEGER NOT NULL DEFAULT 1,
    created_at    INTEGER NOT NULL,
    last_login_at INTEGER
);

CREATE TABLE IF NOT EXISTS invites (
    id          TEXT PRIMARY KEY,
    token       TEXT NOT NULL UNIQUE,
    created_by  TEXT REFERENCES users(id),
    label       TEXT,
    expires_at  INTEGER,
    max_uses    INTEGER,
    use_count   INTEGER NOT NULL DEFAULT 0,
    revoked     INTEGER NOT NULL DEFAULT 0,
    created_at  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS activity_log (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    TEXT,
    action     TEXT NOT NULL,
    detail     TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_activity_created ON activity_log(created_at);
";

/// Shared database handle
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    /// Open (or create) the database at the given path and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        info!(path = %path.display(), "database ready");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (tests).
    pub fn open_in_memory() -> Result<Self, ServerError> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get a reference to the shared connection handle
    pub(crate) fn conn(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    /// User table operations
    pub fn users(&self) -> UserStore {
        UserStore::new(self.conn())
    }

    /// Invite table operations
    pub fn invites(&self) -> InviteStore {
        InviteStore::new(self.conn())
    }

    /// Activity log operations
    pub fn activity(&self) -> ActivityStore {
        ActivityStore::new(self.conn())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory_applies_schema() {
        let db = Db::open_in_memory().unwrap();
        // All three stores work against a fresh schema
        assert_eq!(db.users().list().unwrap().len(), 0);
        assert_eq!(db.invites().list().unwrap().len(), 0);
        assert_eq!(db.activity().list(10).unwrap().len(), 0);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/releye.db");
        let db = Db::open(&path);
        assert!(db.is_ok());
        assert!(path.exists());
    }
}
