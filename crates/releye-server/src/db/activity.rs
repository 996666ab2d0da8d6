//! Activity Log - append-only audit trail
//!
//! Records logins, user lifecycle events, and invite redemptions. The log
//! is append-only; rows are never updated.

use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection};
use serde::Serialize;

/// Upper bound on the number of rows a single listing can return
pub const MAX_LIST_LIMIT: usize = 500;

/// One activity log entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub id: i64,
    pub user_id: Option<String>,
    pub action: String,
    pub detail: Option<String>,
    pub created_at: i64,
}

/// Append/list operations for the activity log
pub struct ActivityStore {
    conn: Arc<Mutex<Connection>>,
}

impl ActivityStore {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Append an entry.
    pub fn record(
        &self,
        user_id: Option<&str>,
        action: &str,
        detail: Option<&str>,
    ) -> rusqlite::Result<()> {
        let now = chrono::Utc::now().timestamp();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO activity_log (user_id, action, detail, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, action, detail, now],
        )?;
        Ok(())
    }

    /// Most recent entries first; `limit` is clamped to [`MAX_LIST_LIMIT`].
    pub fn list(&self, limit: usize) -> rusqlite::Result<Vec<ActivityEntry>> {
        let limit = limit.min(MAX_LIST_LIMIT);
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, action, detail, created_at FROM activity_log
             ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(ActivityEntry {
                id: row.get(0)?,
                user_id: row.get(1)?,
                action: row.get(2)?,
                detail: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        rows.collect()
    }
}
