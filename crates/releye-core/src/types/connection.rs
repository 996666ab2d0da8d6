//! Connection record - an edge between two people

use serde::{Deserialize, Serialize};

use crate::types::{ConnectionId, PersonId};

/// Lowest allowed tie strength
pub const MIN_STRENGTH: u8 = 1;
/// Highest allowed tie strength
pub const MAX_STRENGTH: u8 = 5;

/// The kind of relationship a connection represents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    Family,
    Friend,
    Colleague,
    Romantic,
    Acquaintance,
    /// Free-form label for anything the fixed kinds don't cover
    Custom(String),
}

impl ConnectionKind {
    /// Human-readable label for display and reports
    pub fn label(&self) -> &str {
        match self {
            ConnectionKind::Family => "family",
            ConnectionKind::Friend => "friend",
            ConnectionKind::Colleague => "colleague",
            ConnectionKind::Romantic => "romantic",
            ConnectionKind::Acquaintance => "acquaintance",
            ConnectionKind::Custom(label) => label.as_str(),
        }
    }

    /// Parse a kind from a user-supplied label
    ///
    /// Unknown labels become `Custom`; empty labels are rejected.
    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.to_ascii_lowercase().as_str() {
            "family" => ConnectionKind::Family,
            "friend" => ConnectionKind::Friend,
            "colleague" => ConnectionKind::Colleague,
            "romantic" => ConnectionKind::Romantic,
            "acquaintance" => ConnectionKind::Acquaintance,
            _ => ConnectionKind::Custom(trimmed.to_string()),
        })
    }
}

impl Default for ConnectionKind {
    fn default() -> Self {
        ConnectionKind::Acquaintance
    }
}

/// A connection between two people in the network
///
/// Connections are undirected for dedup purposes: at most one connection
/// exists per pair of people, whichever way it was drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Unique identifier
    pub id: ConnectionId,

    /// Person the connection was drawn from
    pub from: PersonId,

    /// Person the connection was drawn to
    pub to: PersonId,

    /// Relationship kind
    pub kind: ConnectionKind,

    /// Tie strength, 1 (weak) to 5 (strong)
    pub strength: u8,

    /// Free-form notes
    pub notes: String,

    /// Unix timestamp when the connection was created
    pub created_at: i64,
}

impl Connection {
    /// Create a new connection with default strength
    pub fn new(from: PersonId, to: PersonId, kind: ConnectionKind) -> Self {
        Self {
            id: ConnectionId::new(),
            from,
            to,
            kind,
            strength: 3,
            notes: String::new(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Set the tie strength, clamped to the valid range
    pub fn set_strength(&mut self, strength: u8) {
        self.strength = strength.clamp(MIN_STRENGTH, MAX_STRENGTH);
    }

    /// Whether this connection touches the given person
    pub fn involves(&self, person: &PersonId) -> bool {
        &self.from == person || &self.to == person
    }

    /// Whether this connection links the same (unordered) pair
    pub fn links_pair(&self, a: &PersonId, b: &PersonId) -> bool {
        (&self.from == a && &self.to == b) || (&self.from == b && &self.to == a)
    }
}
