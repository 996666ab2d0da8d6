//! Persistent local storage using redb.
//!
//! This module provides ACID-compliant storage for:
//! - Workspace metadata
//! - Graph documents (JSON blobs, one per workspace)
//! - Person photos (content-addressed)

use crate::error::RelEyeError;
use crate::types::{WorkspaceId, WorkspaceInfo};
use parking_lot::RwLock;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

// Submodules
mod photos;

use photos::PHOTOS_TABLE;

// Table definitions
const WORKSPACES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("workspaces");
const DOCUMENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("documents");

/// Storage layer using redb for ACID-compliant persistence
#[derive(Clone)]
pub struct Storage {
    db: Arc<RwLock<Database>>,
}

impl Storage {
    /// Get a reference to the shared database handle
    pub fn db_handle(&self) -> Arc<RwLock<Database>> {
        self.db.clone()
    }

    /// Create a new storage instance at the given path.
    ///
    /// This will:
    /// - Create the database directory if it doesn't exist
    /// - Initialize the database file
    /// - Create all required tables
    pub fn new(path: impl AsRef<Path>) -> Result<Self, RelEyeError> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Open/create database
        let db = Database::create(path)?;

        // Initialize all tables
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(WORKSPACES_TABLE)?;
            let _ = write_txn.open_table(DOCUMENTS_TABLE)?;
            let _ = write_txn.open_table(PHOTOS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self {
            db: Arc::new(RwLock::new(db)),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Workspace Operations
    // ═══════════════════════════════════════════════════════════════════════

    /// Save a workspace to the database.
    ///
    /// If a workspace with the same ID already exists, it will be overwritten.
    pub fn save_workspace(&self, info: &WorkspaceInfo) -> Result<(), RelEyeError> {
        let db = self.db.read();
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(WORKSPACES_TABLE)?;
            let data =
                serde_json::to_vec(info).map_err(|e| RelEyeError::Serialization(e.to_string()))?;
            let key = info.id.to_base58();
            table.insert(key.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Load a single workspace by ID from the database.
    ///
    /// Returns `None` if no workspace with the given ID exists.
    pub fn load_workspace(&self, id: &WorkspaceId) -> Result<Option<WorkspaceInfo>, RelEyeError> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(WORKSPACES_TABLE)?;
        let key = id.to_base58();

        match table.get(key.as_str())? {
            Some(v) => {
                let info: WorkspaceInfo = serde_json::from_slice(v.value())
                    .map_err(|e| RelEyeError::Serialization(e.to_string()))?;
                Ok(Some(info))
            }
            None => Ok(None),
        }
    }

    /// Load all workspaces from the database.
    pub fn list_workspaces(&self) -> Result<Vec<WorkspaceInfo>, RelEyeError> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(WORKSPACES_TABLE)?;

        let mut workspaces = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let info: WorkspaceInfo = serde_json::from_slice(value.value())
                .map_err(|e| RelEyeError::Serialization(e.to_string()))?;
            workspaces.push(info);
        }
        Ok(workspaces)
    }

    /// Delete a workspace and its graph document.
    pub fn delete_workspace(&self, id: &WorkspaceId) -> Result<(), RelEyeError> {
        let db = self.db.read();
        let write_txn = db.begin_write()?;
        {
            let key = id.to_base58();
            let mut workspaces = write_txn.open_table(WORKSPACES_TABLE)?;
            let mut documents = write_txn.open_table(DOCUMENTS_TABLE)?;

            workspaces.remove(key.as_str())?;
            documents.remove(key.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Document Operations
    // ═══════════════════════════════════════════════════════════════════════

    /// Save a graph document (JSON blob) for a workspace.
    pub fn save_document(&self, id: &WorkspaceId, data: &[u8]) -> Result<(), RelEyeError> {
        let db = self.db.read();
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(DOCUMENTS_TABLE)?;
            let key = id.to_base58();
            table.insert(key.as_str(), data)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Load a graph document for a workspace.
    ///
    /// Returns `None` if no document exists for the given workspace.
    pub fn load_document(&self, id: &WorkspaceId) -> Result<Option<Vec<u8>>, RelEyeError> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(DOCUMENTS_TABLE)?;
        let key = id.to_base58();

        Ok(table.get(key.as_str())?.map(|v| v.value().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (Storage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.redb");
        let storage = Storage::new(&db_path).unwrap();
        (storage, temp_dir)
    }

    #[test]
    fn test_storage_can_be_created() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.redb");
        let storage = Storage::new(&db_path);
        assert!(storage.is_ok());
    }

    #[test]
    fn test_storage_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested/path/to/test.redb");
        let storage = Storage::new(&db_path);
        assert!(storage.is_ok());
        assert!(db_path.exists());
    }

    #[test]
    fn test_save_and_load_workspace() {
        let (storage, _temp) = create_test_storage();

        let info = WorkspaceInfo::new("Test Network");
        let id = info.id.clone();

        storage.save_workspace(&info).unwrap();

        let loaded = storage.load_workspace(&id).unwrap();
        assert!(loaded.is_some());
        let loaded = loaded.unwrap();
        assert_eq!(loaded.name, "Test Network");
        assert_eq!(loaded.id, id);
    }

    #[test]
    fn test_load_nonexistent_workspace() {
        let (storage, _temp) = create_test_storage();

        let id = WorkspaceId::new();
        let loaded = storage.load_workspace(&id).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_list_workspaces() {
        let (storage, _temp) = create_test_storage();

        storage.save_workspace(&WorkspaceInfo::new("One")).unwrap();
        storage.save_workspace(&WorkspaceInfo::new("Two")).unwrap();
        storage.save_workspace(&WorkspaceInfo::new("Three")).unwrap();

        let workspaces = storage.list_workspaces().unwrap();
        assert_eq!(workspaces.len(), 3);

        let names: Vec<_> = workspaces.iter().map(|w| w.name.as_str()).collect();
        assert!(names.contains(&"One"));
        assert!(names.contains(&"Two"));
        assert!(names.contains(&"Three"));
    }

    #[test]
    fn test_delete_workspace_removes_document() {
        let (storage, _temp) = create_test_storage();

        let info = WorkspaceInfo::new("With Data");
        let id = info.id.clone();

        storage.save_workspace(&info).unwrap();
        storage.save_document(&id, b"doc data").unwrap();

        assert!(storage.load_workspace(&id).unwrap().is_some());
        assert!(storage.load_document(&id).unwrap().is_some());

        storage.delete_workspace(&id).unwrap();

        assert!(storage.load_workspace(&id).unwrap().is_none());
        assert!(storage.load_document(&id).unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_document() {
        let (storage, _temp) = create_test_storage();

        let id = WorkspaceId::new();
        let data = b"test document data".to_vec();

        storage.save_document(&id, &data).unwrap();

        let loaded = storage.load_document(&id).unwrap();
        assert!(loaded.is_some());
        assert_eq!(loaded.unwrap(), data);
    }

    #[test]
    fn test_load_nonexistent_document() {
        let (storage, _temp) = create_test_storage();

        let id = WorkspaceId::new();
        let loaded = storage.load_document(&id).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_workspace_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.redb");

        let id = {
            let storage = Storage::new(&db_path).unwrap();
            let info = WorkspaceInfo::new("Persistent");
            storage.save_workspace(&info).unwrap();
            info.id
        };

        {
            let storage = Storage::new(&db_path).unwrap();
            let loaded = storage.load_workspace(&id).unwrap().unwrap();
            assert_eq!(loaded.name, "Persistent");
        }
    }
}
