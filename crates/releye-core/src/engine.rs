//! RelEye engine - the high-level API over storage and graph documents
//!
//! `RelEyeEngine` owns the local storage plus an in-memory cache of open
//! graph documents. Every mutating operation persists the document (and
//! bumps the workspace's `updated_at`) before returning, so a crash never
//! loses more than the operation in flight.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{RelEyeError, RelEyeResult};
use crate::graph::GraphDoc;
use crate::report::{self, ReportOptions};
use crate::storage::Storage;
use crate::types::{
    ConnectionId, ConnectionKind, GroupId, PersonId, ViewSettings, WorkspaceId, WorkspaceInfo,
};
use crate::vault;

/// Database file name inside the data directory
const DB_FILE: &str = "releye.redb";

/// High-level engine for relationship-network workspaces
///
/// # Example
///
/// ```no_run
/// use releye_core::RelEyeEngine;
/// use releye_core::types::ConnectionKind;
///
/// # fn main() -> Result<(), releye_core::RelEyeError> {
/// let mut engine = RelEyeEngine::new("~/.releye/data")?;
///
/// let ws = engine.create_workspace("Family")?;
/// let ada = engine.add_person(&ws, "Ada")?;
/// let grace = engine.add_person(&ws, "Grace")?;
/// engine.add_connection(&ws, &ada, &grace, ConnectionKind::Family)?;
///
/// println!("{}", engine.report(&ws, &Default::default())?);
/// # Ok(())
/// # }
/// ```
pub struct RelEyeEngine {
    data_dir: PathBuf,
    storage: Storage,
    /// Open graph documents, keyed by workspace id base58
    open_docs: HashMap<String, GraphDoc>,
    /// PBKDF2 cost used when sealing vaults
    kdf_rounds: u32,
}

impl RelEyeEngine {
    /// Create an engine with storage rooted at the given data directory.
    pub fn new(data_dir: impl AsRef<Path>) -> RelEyeResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let storage = Storage::new(data_dir.join(DB_FILE))?;
        info!(data_dir = %data_dir.display(), "engine started");

        Ok(Self {
            data_dir,
            storage,
            open_docs: HashMap::new(),
            kdf_rounds: vault::DEFAULT_KDF_ROUNDS,
        })
    }

    /// Override the PBKDF2 cost used for vault export.
    pub fn set_kdf_rounds(&mut self, rounds: u32) {
        self.kdf_rounds = rounds;
    }

    /// The engine's data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Direct access to the storage layer
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Workspace Lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    /// Create a new empty workspace and return its id.
    pub fn create_workspace(&mut self, name: &str) -> RelEyeResult<WorkspaceId> {
        let info = WorkspaceInfo::new(name);
        let id = info.id.clone();

        let doc = GraphDoc::new();
        self.storage.save_workspace(&info)?;
        self.storage.save_document(&id, &doc.to_bytes()?)?;
        self.open_docs.insert(id.to_base58(), doc);

        info!(workspace = %id, name, "created workspace");
        Ok(id)
    }

    /// List all workspaces.
    pub fn list_workspaces(&self) -> RelEyeResult<Vec<WorkspaceInfo>> {
        self.storage.list_workspaces()
    }

    /// Get a workspace's metadata.
    pub fn get_workspace(&self, id: &WorkspaceId) -> RelEyeResult<Option<WorkspaceInfo>> {
        self.storage.load_workspace(id)
    }

    /// Whether the workspace's document is currently loaded.
    pub fn is_open(&self, id: &WorkspaceId) -> bool {
        self.open_docs.contains_key(&id.to_base58())
    }

    /// Drop a workspace's document from the in-memory cache.
    ///
    /// Documents are persisted on every mutation, so closing never loses data.
    pub fn close_workspace(&mut self, id: &WorkspaceId) {
        self.open_docs.remove(&id.to_base58());
    }

    /// Delete a workspace and all its data.
    pub fn delete_workspace(&mut self, id: &WorkspaceId) -> RelEyeResult<()> {
        if self.storage.load_workspace(id)?.is_none() {
            return Err(RelEyeError::WorkspaceNotFound(id.to_string()));
        }
        self.open_docs.remove(&id.to_base58());
        self.storage.delete_workspace(id)?;
        info!(workspace = %id, "deleted workspace");
        Ok(())
    }

    /// Read access to a workspace's graph document (loads it if needed).
    pub fn doc(&mut self, id: &WorkspaceId) -> RelEyeResult<&GraphDoc> {
        self.ensure_open(id)?;
        self.open_docs
            .get(&id.to_base58())
            .ok_or_else(|| RelEyeError::WorkspaceNotFound(id.to_string()))
    }

    /// Load the workspace's document into the cache if it isn't already.
    fn ensure_open(&mut self, id: &WorkspaceId) -> RelEyeResult<()> {
        let key = id.to_base58();
        if self.open_docs.contains_key(&key) {
            return Ok(());
        }
        let data = self
            .storage
            .load_document(id)?
            .ok_or_else(|| RelEyeError::WorkspaceNotFound(id.to_string()))?;
        let doc = GraphDoc::from_bytes(&data)?;
        debug!(workspace = %id, "opened workspace document");
        self.open_docs.insert(key, doc);
        Ok(())
    }

    /// Run a mutation against the document and persist the result.
    fn with_doc_mut<T>(
        &mut self,
        id: &WorkspaceId,
        f: impl FnOnce(&mut GraphDoc) -> RelEyeResult<T>,
    ) -> RelEyeResult<T> {
        self.ensure_open(id)?;
        let doc = self
            .open_docs
            .get_mut(&id.to_base58())
            .ok_or_else(|| RelEyeError::WorkspaceNotFound(id.to_string()))?;

        let result = f(doc)?;

        let bytes = doc.to_bytes()?;
        self.storage.save_document(id, &bytes)?;
        if let Some(mut info) = self.storage.load_workspace(id)? {
            info.touch();
            self.storage.save_workspace(&info)?;
        }
        Ok(result)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Person Operations
    // ═══════════════════════════════════════════════════════════════════════

    pub fn add_person(&mut self, ws: &WorkspaceId, name: &str) -> RelEyeResult<PersonId> {
        self.with_doc_mut(ws, |doc| Ok(doc.add_person(name)))
    }

    pub fn rename_person(
        &mut self,
        ws: &WorkspaceId,
        person: &PersonId,
        name: &str,
    ) -> RelEyeResult<()> {
        self.with_doc_mut(ws, |doc| doc.rename_person(person, name))
    }

    pub fn set_person_notes(
        &mut self,
        ws: &WorkspaceId,
        person: &PersonId,
        notes: &str,
    ) -> RelEyeResult<()> {
        self.with_doc_mut(ws, |doc| doc.set_person_notes(person, notes))
    }

    pub fn set_person_role(
        &mut self,
        ws: &WorkspaceId,
        person: &PersonId,
        role: Option<String>,
    ) -> RelEyeResult<()> {
        self.with_doc_mut(ws, |doc| doc.set_person_role(person, role))
    }

    pub fn move_person(
        &mut self,
        ws: &WorkspaceId,
        person: &PersonId,
        x: f64,
        y: f64,
    ) -> RelEyeResult<()> {
        self.with_doc_mut(ws, |doc| doc.move_person(person, x, y))
    }

    pub fn remove_person(&mut self, ws: &WorkspaceId, person: &PersonId) -> RelEyeResult<()> {
        self.with_doc_mut(ws, |doc| doc.remove_person(person).map(|_| ()))
    }

    /// Attach a photo to a person.
    ///
    /// The bytes are stored content-addressed; returns the photo hash.
    pub fn attach_photo(
        &mut self,
        ws: &WorkspaceId,
        person: &PersonId,
        data: &[u8],
    ) -> RelEyeResult<String> {
        let hash = self.storage.save_photo(data)?;
        self.with_doc_mut(ws, |doc| {
            doc.set_person_photo(person, Some(hash.clone()))?;
            Ok(hash.clone())
        })
    }

    /// Load a person's photo bytes, if they have one.
    pub fn load_photo(&mut self, ws: &WorkspaceId, person: &PersonId) -> RelEyeResult<Option<Vec<u8>>> {
        let doc = self.doc(ws)?;
        let Some(hash) = doc
            .person(person)
            .ok_or_else(|| RelEyeError::PersonNotFound(person.to_string()))?
            .photo_hash
            .clone()
        else {
            return Ok(None);
        };
        self.storage.load_photo(&hash)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Connection Operations
    // ═══════════════════════════════════════════════════════════════════════

    pub fn add_connection(
        &mut self,
        ws: &WorkspaceId,
        from: &PersonId,
        to: &PersonId,
        kind: ConnectionKind,
    ) -> RelEyeResult<ConnectionId> {
        self.with_doc_mut(ws, |doc| doc.add_connection(from, to, kind))
    }

    pub fn set_connection_strength(
        &mut self,
        ws: &WorkspaceId,
        conn: &ConnectionId,
        strength: u8,
    ) -> RelEyeResult<()> {
        self.with_doc_mut(ws, |doc| doc.set_connection_strength(conn, strength))
    }

    pub fn set_connection_kind(
        &mut self,
        ws: &WorkspaceId,
        conn: &ConnectionId,
        kind: ConnectionKind,
    ) -> RelEyeResult<()> {
        self.with_doc_mut(ws, |doc| doc.set_connection_kind(conn, kind))
    }

    pub fn set_connection_notes(
        &mut self,
        ws: &WorkspaceId,
        conn: &ConnectionId,
        notes: &str,
    ) -> RelEyeResult<()> {
        self.with_doc_mut(ws, |doc| doc.set_connection_notes(conn, notes))
    }

    pub fn remove_connection(&mut self, ws: &WorkspaceId, conn: &ConnectionId) -> RelEyeResult<()> {
        self.with_doc_mut(ws, |doc| doc.remove_connection(conn).map(|_| ()))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Group Operations
    // ═══════════════════════════════════════════════════════════════════════

    pub fn add_group(
        &mut self,
        ws: &WorkspaceId,
        name: &str,
        color: Option<&str>,
    ) -> RelEyeResult<GroupId> {
        self.with_doc_mut(ws, |doc| doc.add_group(name, color))
    }

    pub fn assign_person_group(
        &mut self,
        ws: &WorkspaceId,
        person: &PersonId,
        group: Option<GroupId>,
    ) -> RelEyeResult<()> {
        self.with_doc_mut(ws, |doc| doc.assign_person_group(person, group))
    }

    pub fn rename_group(&mut self, ws: &WorkspaceId, group: &GroupId, name: &str) -> RelEyeResult<()> {
        self.with_doc_mut(ws, |doc| doc.rename_group(group, name))
    }

    pub fn set_group_color(
        &mut self,
        ws: &WorkspaceId,
        group: &GroupId,
        color: &str,
    ) -> RelEyeResult<()> {
        self.with_doc_mut(ws, |doc| doc.set_group_color(group, color))
    }

    pub fn remove_group(&mut self, ws: &WorkspaceId, group: &GroupId) -> RelEyeResult<()> {
        self.with_doc_mut(ws, |doc| doc.remove_group(group).map(|_| ()))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // View Settings
    // ═══════════════════════════════════════════════════════════════════════

    pub fn set_view_settings(
        &mut self,
        ws: &WorkspaceId,
        settings: ViewSettings,
    ) -> RelEyeResult<()> {
        self.with_doc_mut(ws, |doc| {
            doc.set_settings(settings);
            Ok(())
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Vault Export / Import
    // ═══════════════════════════════════════════════════════════════════════

    /// Encrypt a workspace to a vault file on disk.
    pub fn export_vault(
        &mut self,
        ws: &WorkspaceId,
        path: impl AsRef<Path>,
        passphrase: &str,
    ) -> RelEyeResult<()> {
        let info = self
            .storage
            .load_workspace(ws)?
            .ok_or_else(|| RelEyeError::WorkspaceNotFound(ws.to_string()))?;
        self.ensure_open(ws)?;
        let doc = self
            .open_docs
            .get(&ws.to_base58())
            .ok_or_else(|| RelEyeError::WorkspaceNotFound(ws.to_string()))?;

        let bytes = vault::seal_workspace_with_rounds(&info, doc, passphrase, self.kdf_rounds)?;
        std::fs::write(path.as_ref(), bytes)?;
        info!(workspace = %ws, path = %path.as_ref().display(), "exported vault");
        Ok(())
    }

    /// Decrypt a vault file and install it as a workspace.
    ///
    /// The workspace id embedded in the vault is kept; importing a vault
    /// whose workspace already exists fails with `WorkspaceExists`.
    pub fn import_vault(
        &mut self,
        path: impl AsRef<Path>,
        passphrase: &str,
    ) -> RelEyeResult<WorkspaceId> {
        let data = std::fs::read(path.as_ref())?;
        let (info, doc) = vault::open_workspace(&data, passphrase)?;

        if self.storage.load_workspace(&info.id)?.is_some() {
            return Err(RelEyeError::WorkspaceExists(info.id.to_string()));
        }

        let id = info.id.clone();
        self.storage.save_workspace(&info)?;
        self.storage.save_document(&id, &doc.to_bytes()?)?;
        self.open_docs.insert(id.to_base58(), doc);
        info!(workspace = %id, "imported vault");
        Ok(id)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Reports
    // ═══════════════════════════════════════════════════════════════════════

    /// Render a markdown report for a workspace.
    pub fn report(&mut self, ws: &WorkspaceId, options: &ReportOptions) -> RelEyeResult<String> {
        let info = self
            .storage
            .load_workspace(ws)?
            .ok_or_else(|| RelEyeError::WorkspaceNotFound(ws.to_string()))?;
        let doc = self.doc(ws)?;
        Ok(report::generate_report(&info, doc, options))
    }
}
