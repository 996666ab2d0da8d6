//! Invite Storage - CRUD operations for the invites table
//!
//! The invite's primary key is the hex invite ID embedded in its share
//! token, so redeeming decodes the token and looks the row up directly.
//! The row is authoritative: expiry, revocation, and the use counter are
//! all checked against the database, never the token alone.

use std::sync::Arc;

use parking_lot::Mutex;
use releye_core::InviteToken;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

/// An invite record, safe to serialize into API responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invite {
    pub id: String,
    pub token: String,
    pub created_by: Option<String>,
    pub label: Option<String>,
    pub expires_at: Option<i64>,
    pub max_uses: Option<i64>,
    pub use_count: i64,
    pub revoked: bool,
    pub created_at: i64,
}

impl Invite {
    /// Whether this invite can still be redeemed.
    pub fn is_redeemable(&self, now: i64) -> bool {
        if self.revoked {
            return false;
        }
        if let Some(expires_at) = self.expires_at {
            if now > expires_at {
                return false;
            }
        }
        if let Some(max_uses) = self.max_uses {
            if self.use_count >= max_uses {
                return false;
            }
        }
        true
    }
}

/// Fields for creating an invite
#[derive(Debug, Clone, Default)]
pub struct NewInvite {
    pub created_by: Option<String>,
    pub label: Option<String>,
    pub expires_at: Option<i64>,
    pub max_uses: Option<i64>,
}

/// CRUD operations for the invites table
pub struct InviteStore {
    conn: Arc<Mutex<Connection>>,
}

fn row_to_invite(row: &Row<'_>) -> rusqlite::Result<Invite> {
    Ok(Invite {
        id: row.get(0)?,
        token: row.get(1)?,
        created_by: row.get(2)?,
        label: row.get(3)?,
        expires_at: row.get(4)?,
        max_uses: row.get(5)?,
        use_count: row.get(6)?,
        revoked: row.get::<_, i64>(7)? != 0,
        created_at: row.get(8)?,
    })
}

const INVITE_COLUMNS: &str =
    "id, token, created_by, label, expires_at, max_uses, use_count, revoked, created_at";

impl InviteStore {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Mint a new invite: generate the share token, store the row.
    pub fn create(&self, new: NewInvite) -> Result<Invite, crate::error::ApiError> {
        let mut token = InviteToken::new();
        if let Some(expires_at) = new.expires_at {
            token = token.with_expiry(expires_at);
        }
        if let Some(max_uses) = new.max_uses {
            token = token.with_max_uses(max_uses as u32);
        }
        if let Some(label) = &new.label {
            token = token.with_label(label);
        }

        let id = token.invite_id_hex();
        let encoded = token.encode()?;
        let now = chrono::Utc::now().timestamp();

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO invites (id, token, created_by, label, expires_at, max_uses, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                encoded,
                new.created_by,
                new.label,
                new.expires_at,
                new.max_uses,
                now
            ],
        )?;

        conn.query_row(
            &format!("SELECT {INVITE_COLUMNS} FROM invites WHERE id = ?1"),
            params![id],
            row_to_invite,
        )
        .map_err(Into::into)
    }

    /// Load an invite by id.
    pub fn get(&self, id: &str) -> rusqlite::Result<Option<Invite>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {INVITE_COLUMNS} FROM invites WHERE id = ?1"),
            params![id],
            row_to_invite,
        )
        .optional()
    }

    /// List all invites, newest first.
    pub fn list(&self) -> rusqlite::Result<Vec<Invite>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {INVITE_COLUMNS} FROM invites ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map([], row_to_invite)?;
        rows.collect()
    }

    /// Mark an invite revoked; returns whether a row was affected.
    pub fn revoke(&self, id: &str) -> rusqlite::Result<bool> {
        let conn = self.conn.lock();
        let changed = conn.execute("UPDATE invites SET revoked = 1 WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Increment the use counter after a successful redemption.
    pub fn record_use(&self, id: &str) -> rusqlite::Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE invites SET use_count = use_count + 1 WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    }
}
