//! Graph document for a workspace
//!
//! GraphDoc holds the full editable state of one relationship network:
//! people, connections, groups, and the canvas view settings. It is the
//! unit of persistence - the whole document is serialized to JSON and
//! stored (or encrypted and exported) as one blob.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{RelEyeError, RelEyeResult};
use crate::types::{
    group, Connection, ConnectionId, ConnectionKind, Group, GroupId, Person, PersonId,
    ViewSettings,
};

/// The graph document for one workspace
///
/// All maps are keyed by the id's string representation so the JSON
/// form is stable and diff-friendly. BTreeMap keeps iteration order
/// deterministic, which the report generator relies on.
///
/// # Invariants
///
/// - Every connection's endpoints exist in `persons`
/// - At most one connection exists per unordered pair of people
/// - Every person's `group_id` names a group in `groups`
///
/// # Example
///
/// ```
/// use releye_core::graph::GraphDoc;
/// use releye_core::types::ConnectionKind;
///
/// let mut doc = GraphDoc::new();
/// let ada = doc.add_person("Ada");
/// let grace = doc.add_person("Grace");
/// doc.add_connection(&ada, &grace, ConnectionKind::Colleague).unwrap();
///
/// assert_eq!(doc.person_count(), 2);
/// assert_eq!(doc.connection_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDoc {
    persons: BTreeMap<String, Person>,
    connections: BTreeMap<String, Connection>,
    groups: BTreeMap<String, Group>,
    settings: ViewSettings,
}

impl GraphDoc {
    /// Create a new empty graph document
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a graph document from JSON bytes
    ///
    /// # Errors
    ///
    /// Returns `RelEyeError::Serialization` if the bytes are not a valid document.
    pub fn from_bytes(data: &[u8]) -> RelEyeResult<Self> {
        serde_json::from_slice(data).map_err(|e| RelEyeError::Serialization(e.to_string()))
    }

    /// Serialize the document to JSON bytes
    pub fn to_bytes(&self) -> RelEyeResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| RelEyeError::Serialization(e.to_string()))
    }

    /// Whether the document has no people, connections, or groups
    pub fn is_empty(&self) -> bool {
        self.persons.is_empty() && self.connections.is_empty() && self.groups.is_empty()
    }

    pub fn person_count(&self) -> usize {
        self.persons.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Person Operations
    // ═══════════════════════════════════════════════════════════════════════

    /// Add a new person and return its id
    pub fn add_person(&mut self, name: &str) -> PersonId {
        let person = Person::new(name);
        let id = person.id.clone();
        self.persons.insert(id.to_string_repr(), person);
        id
    }

    /// Get a person by id
    pub fn person(&self, id: &PersonId) -> Option<&Person> {
        self.persons.get(&id.to_string_repr())
    }

    /// List all persons in deterministic (id) order
    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.persons.values()
    }

    /// Rename a person
    pub fn rename_person(&mut self, id: &PersonId, name: &str) -> RelEyeResult<()> {
        let person = self.person_mut(id)?;
        person.name = name.to_string();
        person.touch();
        Ok(())
    }

    /// Set or clear a person's role tagline
    pub fn set_person_role(&mut self, id: &PersonId, role: Option<String>) -> RelEyeResult<()> {
        let person = self.person_mut(id)?;
        person.role = role;
        person.touch();
        Ok(())
    }

    /// Replace a person's notes
    pub fn set_person_notes(&mut self, id: &PersonId, notes: &str) -> RelEyeResult<()> {
        let person = self.person_mut(id)?;
        person.notes = notes.to_string();
        person.touch();
        Ok(())
    }

    /// Set or clear a person's photo hash
    pub fn set_person_photo(&mut self, id: &PersonId, photo_hash: Option<String>) -> RelEyeResult<()> {
        let person = self.person_mut(id)?;
        person.photo_hash = photo_hash;
        person.touch();
        Ok(())
    }

    /// Move a person on the canvas
    pub fn move_person(&mut self, id: &PersonId, x: f64, y: f64) -> RelEyeResult<()> {
        let person = self.person_mut(id)?;
        person.position.x = x;
        person.position.y = y;
        person.touch();
        Ok(())
    }

    /// Assign a person to a group, or clear the membership with `None`
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` if the target group does not exist.
    pub fn assign_person_group(
        &mut self,
        id: &PersonId,
        group_id: Option<GroupId>,
    ) -> RelEyeResult<()> {
        if let Some(ref gid) = group_id {
            if !self.groups.contains_key(&gid.to_string_repr()) {
                return Err(RelEyeError::GroupNotFound(gid.to_string()));
            }
        }
        let person = self.person_mut(id)?;
        person.group_id = group_id;
        person.touch();
        Ok(())
    }

    /// Remove a person and every connection that references them
    ///
    /// Returns the removed person.
    pub fn remove_person(&mut self, id: &PersonId) -> RelEyeResult<Person> {
        let person = self
            .persons
            .remove(&id.to_string_repr())
            .ok_or_else(|| RelEyeError::PersonNotFound(id.to_string()))?;

        // Cascade: drop all connections touching the removed person
        self.connections.retain(|_, conn| !conn.involves(id));

        Ok(person)
    }

    fn person_mut(&mut self, id: &PersonId) -> RelEyeResult<&mut Person> {
        self.persons
            .get_mut(&id.to_string_repr())
            .ok_or_else(|| RelEyeError::PersonNotFound(id.to_string()))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Connection Operations
    // ═══════════════════════════════════════════════════════════════════════

    /// Connect two people
    ///
    /// # Errors
    ///
    /// - `PersonNotFound` if either endpoint does not exist
    /// - `InvalidOperation` for self-connections
    /// - `DuplicateConnection` if the pair is already connected (either direction)
    pub fn add_connection(
        &mut self,
        from: &PersonId,
        to: &PersonId,
        kind: ConnectionKind,
    ) -> RelEyeResult<ConnectionId> {
        if from == to {
            return Err(RelEyeError::InvalidOperation(
                "cannot connect a person to themselves".to_string(),
            ));
        }
        for endpoint in [from, to] {
            if !self.persons.contains_key(&endpoint.to_string_repr()) {
                return Err(RelEyeError::PersonNotFound(endpoint.to_string()));
            }
        }
        if self.connections.values().any(|c| c.links_pair(from, to)) {
            return Err(RelEyeError::DuplicateConnection(
                from.to_string(),
                to.to_string(),
            ));
        }

        let connection = Connection::new(from.clone(), to.clone(), kind);
        let id = connection.id.clone();
        self.connections.insert(id.to_string_repr(), connection);
        Ok(id)
    }

    /// Get a connection by id
    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(&id.to_string_repr())
    }

    /// List all connections in deterministic (id) order
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// All connections touching the given person
    pub fn connections_of(&self, person: &PersonId) -> Vec<&Connection> {
        self.connections
            .values()
            .filter(|c| c.involves(person))
            .collect()
    }

    /// Change a connection's kind
    pub fn set_connection_kind(
        &mut self,
        id: &ConnectionId,
        kind: ConnectionKind,
    ) -> RelEyeResult<()> {
        self.connection_mut(id)?.kind = kind;
        Ok(())
    }

    /// Change a connection's strength (clamped to 1..=5)
    pub fn set_connection_strength(&mut self, id: &ConnectionId, strength: u8) -> RelEyeResult<()> {
        self.connection_mut(id)?.set_strength(strength);
        Ok(())
    }

    /// Replace a connection's notes
    pub fn set_connection_notes(&mut self, id: &ConnectionId, notes: &str) -> RelEyeResult<()> {
        self.connection_mut(id)?.notes = notes.to_string();
        Ok(())
    }

    /// Remove a connection
    pub fn remove_connection(&mut self, id: &ConnectionId) -> RelEyeResult<Connection> {
        self.connections
            .remove(&id.to_string_repr())
            .ok_or_else(|| RelEyeError::ConnectionNotFound(id.to_string()))
    }

    fn connection_mut(&mut self, id: &ConnectionId) -> RelEyeResult<&mut Connection> {
        self.connections
            .get_mut(&id.to_string_repr())
            .ok_or_else(|| RelEyeError::ConnectionNotFound(id.to_string()))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Group Operations
    // ═══════════════════════════════════════════════════════════════════════

    /// Create a new group
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the color is not a `#rrggbb` string.
    pub fn add_group(&mut self, name: &str, color: Option<&str>) -> RelEyeResult<GroupId> {
        let mut new_group = Group::new(name);
        if let Some(color) = color {
            if !group::is_valid_color(color) {
                return Err(RelEyeError::InvalidOperation(format!(
                    "invalid group color: {color}"
                )));
            }
            new_group.color = color.to_string();
        }
        let id = new_group.id.clone();
        self.groups.insert(id.to_string_repr(), new_group);
        Ok(id)
    }

    /// Get a group by id
    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.get(&id.to_string_repr())
    }

    /// List all groups in deterministic (id) order
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Rename a group
    pub fn rename_group(&mut self, id: &GroupId, name: &str) -> RelEyeResult<()> {
        let found = self
            .groups
            .get_mut(&id.to_string_repr())
            .ok_or_else(|| RelEyeError::GroupNotFound(id.to_string()))?;
        found.name = name.to_string();
        Ok(())
    }

    /// Change a group's color
    pub fn set_group_color(&mut self, id: &GroupId, color: &str) -> RelEyeResult<()> {
        if !group::is_valid_color(color) {
            return Err(RelEyeError::InvalidOperation(format!(
                "invalid group color: {color}"
            )));
        }
        let found = self
            .groups
            .get_mut(&id.to_string_repr())
            .ok_or_else(|| RelEyeError::GroupNotFound(id.to_string()))?;
        found.color = color.to_string();
        Ok(())
    }

    /// Members of a group, in deterministic order
    pub fn members_of(&self, id: &GroupId) -> Vec<&Person> {
        self.persons
            .values()
            .filter(|p| p.group_id.as_ref() == Some(id))
            .collect()
    }

    /// Delete a group, clearing the membership of everyone in it
    ///
    /// People are never deleted with their group.
    pub fn remove_group(&mut self, id: &GroupId) -> RelEyeResult<Group> {
        let removed = self
            .groups
            .remove(&id.to_string_repr())
            .ok_or_else(|| RelEyeError::GroupNotFound(id.to_string()))?;

        for person in self.persons.values_mut() {
            if person.group_id.as_ref() == Some(id) {
                person.group_id = None;
            }
        }

        Ok(removed)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // View Settings
    // ═══════════════════════════════════════════════════════════════════════

    /// Current view settings
    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    /// Replace the view settings (zoom clamped to the valid range)
    pub fn set_settings(&mut self, mut settings: ViewSettings) {
        let zoom = settings.zoom;
        settings.set_zoom(zoom);
        self.settings = settings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::settings::{MAX_ZOOM, Theme};

    fn doc_with_pair() -> (GraphDoc, PersonId, PersonId) {
        let mut doc = GraphDoc::new();
        let a = doc.add_person("Ada");
        let b = doc.add_person("Grace");
        (doc, a, b)
    }

    #[test]
    fn test_add_and_get_person() {
        let mut doc = GraphDoc::new();
        let id = doc.add_person("Ada");
        let person = doc.person(&id).unwrap();
        assert_eq!(person.name, "Ada");
        assert_eq!(doc.person_count(), 1);
    }

    #[test]
    fn test_rename_missing_person_fails() {
        let mut doc = GraphDoc::new();
        let err = doc.rename_person(&PersonId::new(), "Nobody").unwrap_err();
        assert!(matches!(err, RelEyeError::PersonNotFound(_)));
    }

    #[test]
    fn test_add_connection() {
        let (mut doc, a, b) = doc_with_pair();
        let id = doc.add_connection(&a, &b, ConnectionKind::Friend).unwrap();
        let conn = doc.connection(&id).unwrap();
        assert!(conn.links_pair(&a, &b));
        assert_eq!(conn.strength, 3);
    }

    #[test]
    fn test_self_connection_rejected() {
        let (mut doc, a, _) = doc_with_pair();
        let err = doc.add_connection(&a, &a, ConnectionKind::Friend).unwrap_err();
        assert!(matches!(err, RelEyeError::InvalidOperation(_)));
    }

    #[test]
    fn test_connection_requires_both_endpoints() {
        let (mut doc, a, _) = doc_with_pair();
        let ghost = PersonId::new();
        let err = doc.add_connection(&a, &ghost, ConnectionKind::Friend).unwrap_err();
        assert!(matches!(err, RelEyeError::PersonNotFound(_)));
    }

    #[test]
    fn test_duplicate_connection_rejected_both_directions() {
        let (mut doc, a, b) = doc_with_pair();
        doc.add_connection(&a, &b, ConnectionKind::Friend).unwrap();

        let err = doc.add_connection(&a, &b, ConnectionKind::Family).unwrap_err();
        assert!(matches!(err, RelEyeError::DuplicateConnection(_, _)));

        let err = doc.add_connection(&b, &a, ConnectionKind::Family).unwrap_err();
        assert!(matches!(err, RelEyeError::DuplicateConnection(_, _)));
    }

    #[test]
    fn test_remove_person_cascades_connections() {
        let (mut doc, a, b) = doc_with_pair();
        let c = doc.add_person("Margaret");
        doc.add_connection(&a, &b, ConnectionKind::Friend).unwrap();
        doc.add_connection(&a, &c, ConnectionKind::Colleague).unwrap();
        doc.add_connection(&b, &c, ConnectionKind::Colleague).unwrap();

        doc.remove_person(&a).unwrap();

        assert_eq!(doc.person_count(), 2);
        assert_eq!(doc.connection_count(), 1);
        assert!(doc.connections().all(|conn| !conn.involves(&a)));
    }

    #[test]
    fn test_group_membership_and_removal() {
        let (mut doc, a, b) = doc_with_pair();
        let group = doc.add_group("Lab", Some("#112233")).unwrap();
        doc.assign_person_group(&a, Some(group.clone())).unwrap();
        doc.assign_person_group(&b, Some(group.clone())).unwrap();
        assert_eq!(doc.members_of(&group).len(), 2);

        doc.remove_group(&group).unwrap();
        assert_eq!(doc.group_count(), 0);
        // People survive, membership cleared
        assert_eq!(doc.person_count(), 2);
        assert!(doc.persons().all(|p| p.group_id.is_none()));
    }

    #[test]
    fn test_assign_to_missing_group_fails() {
        let (mut doc, a, _) = doc_with_pair();
        let err = doc.assign_person_group(&a, Some(GroupId::new())).unwrap_err();
        assert!(matches!(err, RelEyeError::GroupNotFound(_)));
    }

    #[test]
    fn test_invalid_group_color_rejected() {
        let mut doc = GraphDoc::new();
        let err = doc.add_group("Neon", Some("green")).unwrap_err();
        assert!(matches!(err, RelEyeError::InvalidOperation(_)));
    }

    #[test]
    fn test_settings_zoom_clamped_on_set() {
        let mut doc = GraphDoc::new();
        let mut settings = ViewSettings::default();
        settings.zoom = 50.0;
        settings.theme = Theme::Dark;
        doc.set_settings(settings);
        assert_eq!(doc.settings().zoom, MAX_ZOOM);
        assert_eq!(doc.settings().theme, Theme::Dark);
    }

    #[test]
    fn test_serde_roundtrip_preserves_document() {
        let (mut doc, a, b) = doc_with_pair();
        doc.add_connection(&a, &b, ConnectionKind::Family).unwrap();
        let group = doc.add_group("Family", None).unwrap();
        doc.assign_person_group(&a, Some(group)).unwrap();
        doc.move_person(&b, 10.0, 20.0).unwrap();

        let bytes = doc.to_bytes().unwrap();
        let back = GraphDoc::from_bytes(&bytes).unwrap();
        assert_eq!(doc, back);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let err = GraphDoc::from_bytes(b"not json").unwrap_err();
        assert!(matches!(err, RelEyeError::Serialization(_)));
    }
}
