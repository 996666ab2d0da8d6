//! Photo Storage - content-addressed person photos
//!
//! Stores photo blobs in redb with BLAKE3 content hashes as keys, so the
//! same image attached to several people is stored once.

use crate::error::RelEyeError;
use redb::{ReadableTable, TableDefinition};

use super::Storage;

/// Table for storing photo blobs (key: BLAKE3 hash hex string, value: raw bytes)
pub(crate) const PHOTOS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("photos");

impl Storage {
    /// Save a photo blob and return its content hash
    ///
    /// If the blob already exists, returns the existing hash without
    /// re-storing.
    pub fn save_photo(&self, data: &[u8]) -> Result<String, RelEyeError> {
        let hash_hex = blake3::hash(data).to_hex().to_string();

        let db = self.db_handle();
        let db_guard = db.read();

        // Content-addressed deduplication
        {
            let read_txn = db_guard.begin_read()?;
            let table = read_txn.open_table(PHOTOS_TABLE)?;
            if table.get(hash_hex.as_str())?.is_some() {
                return Ok(hash_hex);
            }
        }

        let write_txn = db_guard.begin_write()?;
        {
            let mut table = write_txn.open_table(PHOTOS_TABLE)?;
            table.insert(hash_hex.as_str(), data)?;
        }
        write_txn.commit()?;

        Ok(hash_hex)
    }

    /// Load a photo blob by content hash
    ///
    /// Returns `None` if the blob doesn't exist.
    pub fn load_photo(&self, hash_hex: &str) -> Result<Option<Vec<u8>>, RelEyeError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let read_txn = db_guard.begin_read()?;
        let table = read_txn.open_table(PHOTOS_TABLE)?;

        if let Some(data) = table.get(hash_hex)? {
            Ok(Some(data.value().to_vec()))
        } else {
            Ok(None)
        }
    }

    /// Check whether a photo blob exists
    pub fn photo_exists(&self, hash_hex: &str) -> Result<bool, RelEyeError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let read_txn = db_guard.begin_read()?;
        let table = read_txn.open_table(PHOTOS_TABLE)?;
        Ok(table.get(hash_hex)?.is_some())
    }

    /// Delete a photo blob by hash
    ///
    /// Returns `Ok(())` even if the blob doesn't exist. Since photos are
    /// content-addressed, deleting removes it for every person sharing it.
    pub fn delete_photo(&self, hash_hex: &str) -> Result<(), RelEyeError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let write_txn = db_guard.begin_write()?;
        {
            let mut table = write_txn.open_table(PHOTOS_TABLE)?;
            table.remove(hash_hex)?;
        }
        write_txn.commit()?;
        Ok(())
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
    fn test_save_and_load_photo() {
        let (storage, _temp) = create_test_storage();

        let data = b"fake png bytes";
        let hash = storage.save_photo(data).unwrap();

        let loaded = storage.load_photo(&hash).unwrap();
        assert_eq!(loaded.unwrap(), data.to_vec());
        assert!(storage.photo_exists(&hash).unwrap());
    }

    #[test]
    fn test_same_content_same_hash() {
        let (storage, _temp) = create_test_storage();

        let hash1 = storage.save_photo(b"identical").unwrap();
        let hash2 = storage.save_photo(b"identical").unwrap();
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_load_missing_photo() {
        let (storage, _temp) = create_test_storage();
        let hash = blake3::hash(b"never stored").to_hex().to_string();
        assert!(storage.load_photo(&hash).unwrap().is_none());
        assert!(!storage.photo_exists(&hash).unwrap());
    }

    #[test]
    fn test_delete_photo() {
        let (storage, _temp) = create_test_storage();

        let hash = storage.save_photo(b"short lived").unwrap();
        storage.delete_photo(&hash).unwrap();
        assert!(storage.load_photo(&hash).unwrap().is_none());

        // Deleting again is fine
        storage.delete_photo(&hash).unwrap();
    }
}
