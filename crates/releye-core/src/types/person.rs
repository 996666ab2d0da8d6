//! Person record - a node in the relationship network

use serde::{Deserialize, Serialize};

use crate::types::{GroupId, PersonId};

/// Position of a node on the editing canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: f64,
    pub y: f64,
}

impl CanvasPoint {
    pub const ORIGIN: CanvasPoint = CanvasPoint { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for CanvasPoint {
    fn default() -> Self {
        Self::ORIGIN
    }
}

/// A person in the relationship network
///
/// Holds the editable fields the canvas renders: name, role, free-form
/// notes, an optional content-addressed photo, the canvas position, and
/// an optional group membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier
    pub id: PersonId,

    /// Display name shown on the canvas
    pub name: String,

    /// Optional role or relationship tagline (e.g., "sister", "manager")
    pub role: Option<String>,

    /// Free-form markdown notes
    pub notes: String,

    /// BLAKE3 hash of the photo blob, if a photo is attached
    pub photo_hash: Option<String>,

    /// Position on the editing canvas
    pub position: CanvasPoint,

    /// Group this person belongs to, if any
    pub group_id: Option<GroupId>,

    /// Unix timestamp when the person was created
    pub created_at: i64,

    /// Unix timestamp of last update
    pub updated_at: i64,
}

impl Person {
    /// Create a new person with just a name
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: PersonId::new(),
            name: name.into(),
            role: None,
            notes: String::new(),
            photo_hash: None,
            position: CanvasPoint::ORIGIN,
            group_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().timestamp();
    }
}
