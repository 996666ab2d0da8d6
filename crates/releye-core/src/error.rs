//! Error types for RelEye

use thiserror::Error;

/// Main error type for RelEye operations
#[derive(Error, Debug)]
pub enum RelEyeError {
    /// Workspace was not found in storage
    #[error("Workspace not found: {0}")]
    WorkspaceNotFound(String),

    /// Workspace with the same id already exists
    #[error("Workspace already exists: {0}")]
    WorkspaceExists(String),

    /// Person was not found in the graph document
    #[error("Person not found: {0}")]
    PersonNotFound(String),

    /// Connection was not found in the graph document
    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    /// Group was not found in the graph document
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// The two people are already connected
    #[error("Duplicate connection between {0} and {1}")]
    DuplicateConnection(String, String),

    /// Error during storage operations (redb)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database creation/opening error
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    /// Transaction error
    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// Table error
    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    /// Storage operation error
    #[error("Storage operation error: {0}")]
    StorageOp(#[from] redb::StorageError),

    /// Commit error
    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    /// Error during serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Cryptographic operation failed
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Decryption failed (wrong passphrase, tampered data, or malformed input)
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Vault file is malformed (bad magic, truncated, or corrupt header)
    #[error("Invalid vault file: {0}")]
    InvalidVault(String),

    /// Vault format version not supported
    #[error("Vault version {0} is not supported")]
    VaultVersionUnsupported(u8),

    /// Invalid invite token format or data
    #[error("Invalid invite: {0}")]
    InvalidInvite(String),

    /// Invalid operation for current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using RelEyeError
pub type RelEyeResult<T> = Result<T, RelEyeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RelEyeError::WorkspaceNotFound("ws-missing".to_string());
        assert_eq!(format!("{}", err), "Workspace not found: ws-missing");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RelEyeError = io_err.into();
        assert!(matches!(err, RelEyeError::Io(_)));
    }
}
