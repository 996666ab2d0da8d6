//! Encrypted workspace export ("vault" files)
//!
//! Encryption-at-rest for workspace files: PBKDF2-HMAC-SHA256 key
//! derivation and AES-256-GCM authenticated encryption. A vault file is
//! self-contained - salt and KDF cost live in the header, so only the
//! passphrase is needed to open it.
//!
//! ## File Format
//!
//! ```text
//! [magic "RELV" (4 bytes)] [version (1 byte)] [postcard VaultFile]
//! ```
//!
//! where `VaultFile.payload = AES-GCM(key, zstd(JSON(VaultBody)))` and the
//! AEAD output carries its random 12-byte nonce prepended.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{RelEyeError, RelEyeResult};
use crate::graph::GraphDoc;
use crate::types::WorkspaceInfo;

/// Nonce size for AES-256-GCM (12 bytes)
pub const NONCE_SIZE: usize = 12;

/// Salt size for PBKDF2 (16 bytes)
pub const SALT_SIZE: usize = 16;

/// Default PBKDF2-HMAC-SHA256 iteration count for new vaults
pub const DEFAULT_KDF_ROUNDS: u32 = 600_000;

/// File magic for vault files
const VAULT_MAGIC: &[u8; 4] = b"RELV";

/// Current vault format version
const VAULT_VERSION: u8 = 1;

/// zstd compression level for vault payloads
const ZSTD_LEVEL: i32 = 3;

/// Encryption utilities for graph data using AES-256-GCM.
///
/// This struct holds a cipher instance initialized with a symmetric key.
/// All encrypted data includes a random nonce prepended to the ciphertext.
///
/// # Wire Format
///
/// Encrypted data format: `[nonce (12 bytes)] + [ciphertext + auth_tag (16 bytes)]`
///
/// # Example
///
/// ```
/// use releye_core::vault::GraphCrypto;
///
/// let key = GraphCrypto::generate_key();
/// let crypto = GraphCrypto::new(&key);
///
/// let plaintext = b"Hello, World!";
/// let ciphertext = crypto.encrypt(plaintext).unwrap();
/// let decrypted = crypto.decrypt(&ciphertext).unwrap();
///
/// assert_eq!(plaintext.as_slice(), decrypted.as_slice());
/// ```
pub struct GraphCrypto {
    cipher: Aes256Gcm,
}

impl GraphCrypto {
    /// Create a new GraphCrypto instance with the given 32-byte key.
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.into()),
        }
    }

    /// Generate a new random 32-byte encryption key.
    ///
    /// Uses the system's cryptographically secure random number generator.
    pub fn generate_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        rand::rng().fill_bytes(&mut key);
        key
    }

    /// Encrypt data using AES-256-GCM.
    ///
    /// The output format is: `[nonce (12 bytes)] + [ciphertext + tag]`
    ///
    /// A random nonce is generated for each encryption operation to ensure
    /// that the same plaintext produces different ciphertext each time.
    pub fn encrypt(&self, plaintext: &[u8]) -> RelEyeResult<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| RelEyeError::Crypto(format!("Encryption failed: {}", e)))?;

        // Prepend nonce to ciphertext
        let mut result = nonce_bytes.to_vec();
        result.extend_from_slice(&ciphertext);

        Ok(result)
    }

    /// Decrypt data using AES-256-GCM.
    ///
    /// Expects format: `[nonce (12 bytes)] + [ciphertext + tag]`
    ///
    /// Fails with `DecryptionFailed` on wrong key, tampered data, or
    /// malformed input.
    pub fn decrypt(&self, ciphertext: &[u8]) -> RelEyeResult<Vec<u8>> {
        if ciphertext.len() < NONCE_SIZE {
            return Err(RelEyeError::DecryptionFailed(
                "Data too short to contain nonce".to_string(),
            ));
        }

        let nonce = Nonce::from_slice(&ciphertext[..NONCE_SIZE]);
        let encrypted = &ciphertext[NONCE_SIZE..];

        self.cipher
            .decrypt(nonce, encrypted)
            .map_err(|e| RelEyeError::DecryptionFailed(e.to_string()))
    }
}

/// Derive a 32-byte key from a passphrase with PBKDF2-HMAC-SHA256.
pub fn derive_key(passphrase: &str, salt: &[u8; SALT_SIZE], rounds: u32) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(passphrase.as_bytes(), salt, rounds, &mut key);
    key
}

/// On-disk vault structure (after magic + version)
#[derive(Debug, Serialize, Deserialize)]
struct VaultFile {
    /// PBKDF2 iteration count used for this vault
    kdf_rounds: u32,
    /// Random per-vault salt
    salt: [u8; SALT_SIZE],
    /// AEAD output: nonce || ciphertext || tag
    payload: Vec<u8>,
}

/// The plaintext content of a vault
#[derive(Debug, Serialize, Deserialize)]
struct VaultBody {
    info: WorkspaceInfo,
    doc: GraphDoc,
}

/// Encrypt a workspace into vault bytes using the default KDF cost.
pub fn seal_workspace(
    info: &WorkspaceInfo,
    doc: &GraphDoc,
    passphrase: &str,
) -> RelEyeResult<Vec<u8>> {
    seal_workspace_with_rounds(info, doc, passphrase, DEFAULT_KDF_ROUNDS)
}

/// Encrypt a workspace into vault bytes with an explicit KDF cost.
pub fn seal_workspace_with_rounds(
    info: &WorkspaceInfo,
    doc: &GraphDoc,
    passphrase: &str,
    kdf_rounds: u32,
) -> RelEyeResult<Vec<u8>> {
    let body = VaultBody {
        info: info.clone(),
        doc: doc.clone(),
    };
    let json =
        serde_json::to_vec(&body).map_err(|e| RelEyeError::Serialization(e.to_string()))?;
    let compressed = zstd::encode_all(json.as_slice(), ZSTD_LEVEL)
        .map_err(|e| RelEyeError::Serialization(format!("zstd encode: {}", e)))?;

    let mut salt = [0u8; SALT_SIZE];
    rand::rng().fill_bytes(&mut salt);
    let key = derive_key(passphrase, &salt, kdf_rounds);
    let payload = GraphCrypto::new(&key).encrypt(&compressed)?;

    let vault = VaultFile {
        kdf_rounds,
        salt,
        payload,
    };
    let encoded = postcard::to_allocvec(&vault)
        .map_err(|e| RelEyeError::Serialization(format!("Failed to encode vault: {}", e)))?;

    let mut out = Vec::with_capacity(VAULT_MAGIC.len() + 1 + encoded.len());
    out.extend_from_slice(VAULT_MAGIC);
    out.push(VAULT_VERSION);
    out.extend_from_slice(&encoded);
    Ok(out)
}

/// Decrypt vault bytes back into a workspace.
///
/// # Errors
///
/// - `InvalidVault` for bad magic, truncated input, or a corrupt header
/// - `VaultVersionUnsupported` for a newer format version
/// - `DecryptionFailed` for a wrong passphrase or tampered payload
pub fn open_workspace(data: &[u8], passphrase: &str) -> RelEyeResult<(WorkspaceInfo, GraphDoc)> {
    if data.len() < VAULT_MAGIC.len() + 1 {
        return Err(RelEyeError::InvalidVault("file too short".to_string()));
    }
    if &data[..VAULT_MAGIC.len()] != VAULT_MAGIC {
        return Err(RelEyeError::InvalidVault("bad magic".to_string()));
    }
    let version = data[VAULT_MAGIC.len()];
    if version != VAULT_VERSION {
        return Err(RelEyeError::VaultVersionUnsupported(version));
    }

    let vault: VaultFile = postcard::from_bytes(&data[VAULT_MAGIC.len() + 1..])
        .map_err(|e| RelEyeError::InvalidVault(format!("corrupt header: {}", e)))?;

    let key = derive_key(passphrase, &vault.salt, vault.kdf_rounds);
    let compressed = GraphCrypto::new(&key).decrypt(&vault.payload)?;
    let json = zstd::decode_all(compressed.as_slice())
        .map_err(|e| RelEyeError::Serialization(format!("zstd decode: {}", e)))?;
    let body: VaultBody =
        serde_json::from_slice(&json).map_err(|e| RelEyeError::Serialization(e.to_string()))?;

    Ok((body.info, body.doc))
}
