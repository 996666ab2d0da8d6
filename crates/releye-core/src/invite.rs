//! Invite tokens for RelEye
//!
//! Provides the compact share format for server-issued invites. A token
//! carries the invite's identity and redemption constraints:
//! - Random invite ID for lookup and revocation
//! - Optional expiry time and use limit
//! - Optional human-readable label
//!
//! Tokens are encoded as `releye-invite:{base58}` strings for easy sharing
//! via link or QR code. The server's invite record stays authoritative;
//! the token is what gets pasted into a signup form.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::RelEyeError;

/// Prefix for encoded invite strings
const INVITE_PREFIX: &str = "releye-invite:";

/// Current token format version
const TOKEN_VERSION: u8 = 1;

/// An invite token carrying identity and redemption constraints.
///
/// # Example
///
/// ```
/// use releye_core::invite::InviteToken;
///
/// let token = InviteToken::new()
///     .with_label("Beta testers")
///     .with_expiry(chrono::Utc::now().timestamp() + 86400)
///     .with_max_uses(10);
///
/// let encoded = token.encode().unwrap();
/// assert!(encoded.starts_with("releye-invite:"));
///
/// let decoded = InviteToken::decode(&encoded).unwrap();
/// assert_eq!(decoded.invite_id, token.invite_id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteToken {
    /// Token format version (for future compatibility)
    pub version: u8,
    /// Unique identifier for this invite (for tracking/revocation)
    pub invite_id: [u8; 16],
    /// Unix timestamp when this invite was issued
    pub issued_at: i64,
    /// Unix timestamp when this invite expires (None = never)
    pub expires_at: Option<i64>,
    /// Maximum number of times this invite can be used (None = unlimited)
    pub max_uses: Option<u32>,
    /// Human-readable label (optional)
    pub label: Option<String>,
}

impl InviteToken {
    /// Create a new invite token with a random ID and no constraints.
    pub fn new() -> Self {
        let mut invite_id = [0u8; 16];
        rand::rng().fill_bytes(&mut invite_id);

        Self {
            version: TOKEN_VERSION,
            invite_id,
            issued_at: chrono::Utc::now().timestamp(),
            expires_at: None,
            max_uses: None,
            label: None,
        }
    }

    /// Set a human-readable label (builder pattern).
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Set an expiry time as Unix timestamp (builder pattern).
    pub fn with_expiry(mut self, expires_at: i64) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Set maximum number of uses (builder pattern).
    pub fn with_max_uses(mut self, max: u32) -> Self {
        self.max_uses = Some(max);
        self
    }

    /// Encode the token as a `releye-invite:{base58}` string.
    ///
    /// Uses postcard for efficient binary serialization, then base58 for
    /// URL-safe encoding.
    pub fn encode(&self) -> Result<String, RelEyeError> {
        let bytes = postcard::to_allocvec(self)
            .map_err(|e| RelEyeError::Serialization(format!("Failed to encode invite: {}", e)))?;
        let encoded = bs58::encode(&bytes).into_string();
        Ok(format!("{}{}", INVITE_PREFIX, encoded))
    }

    /// Decode a token from a `releye-invite:{base58}` string.
    ///
    /// # Errors
    ///
    /// Returns `RelEyeError::InvalidInvite` if:
    /// - The string doesn't start with `releye-invite:`
    /// - The base58 encoding is invalid
    /// - The binary data is malformed
    pub fn decode(s: &str) -> Result<Self, RelEyeError> {
        let data = s.strip_prefix(INVITE_PREFIX).ok_or_else(|| {
            RelEyeError::InvalidInvite(format!(
                "Invalid prefix: expected '{}', got '{}'",
                INVITE_PREFIX,
                s.chars().take(16).collect::<String>()
            ))
        })?;

        let bytes = bs58::decode(data)
            .into_vec()
            .map_err(|e| RelEyeError::InvalidInvite(format!("Invalid base58: {}", e)))?;

        let token: InviteToken = postcard::from_bytes(&bytes)
            .map_err(|e| RelEyeError::InvalidInvite(format!("Invalid token data: {}", e)))?;

        Ok(token)
    }

    /// Check if this invite has expired.
    ///
    /// Returns `false` if no expiry is set.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => chrono::Utc::now().timestamp() > expires,
            None => false,
        }
    }

    /// Hex form of the invite ID, used as the lookup key.
    pub fn invite_id_hex(&self) -> String {
        hex::encode(self.invite_id)
    }
}

impl Default for InviteToken {
    fn default() -> Self {
        Self::new()
    }
}
