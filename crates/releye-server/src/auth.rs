//! Password hashing and verification
//!
//! PBKDF2-HMAC-SHA256 with a random 16-byte salt per user. The stored
//! hash embeds its iteration count (`pbkdf2$<rounds>$<hex>`), so the cost
//! can be raised later without invalidating existing accounts.

use rand::RngCore;

/// Salt length in bytes
pub const SALT_LEN: usize = 16;

/// Derived hash length in bytes
const HASH_LEN: usize = 32;

/// Hash a password, returning `(hash, salt_hex)` for storage.
///
/// The hash string is `pbkdf2$<rounds>$<hash_hex>`.
pub fn hash_password(password: &str, rounds: u32) -> (String, String) {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);

    let mut derived = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(password.as_bytes(), &salt, rounds, &mut derived);

    (
        format!("pbkdf2${}${}", rounds, hex::encode(derived)),
        hex::encode(salt),
    )
}

/// Verify a password against a stored hash and salt.
///
/// Returns `false` for malformed stored values rather than erroring, so a
/// corrupt row behaves like a wrong password.
pub fn verify_password(password: &str, stored_hash: &str, salt_hex: &str) -> bool {
    let mut parts = stored_hash.splitn(3, '$');
    let (Some("pbkdf2"), Some(rounds), Some(hash_hex)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let Ok(rounds) = rounds.parse::<u32>() else {
        return false;
    };
    let Ok(expected) = hex::decode(hash_hex) else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    if expected.len() != HASH_LEN {
        return false;
    }

    let mut derived = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(password.as_bytes(), &salt, rounds, &mut derived);

    // Constant-time comparison
    let mut diff = 0u8;
    for (a, b) in derived.iter().zip(expected.iter()) {
        diff |= a ^ b;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_ROUNDS: u32 = 1_000;

    #[test]
    fn test_hash_and_verify() {
        let (hash, salt) = hash_password("hunter2", TEST_ROUNDS);
        assert!(hash.starts_with("pbkdf2$1000$"));
        assert!(verify_password("hunter2", &hash, &salt));
        assert!(!verify_password("hunter3", &hash, &salt));
    }

    #[test]
    fn test_salts_are_unique() {
        let (hash_a, salt_a) = hash_password("same", TEST_ROUNDS);
        let (hash_b, salt_b) = hash_password("same", TEST_ROUNDS);
        assert_ne!(salt_a, salt_b);
        assert_ne!(hash_a, hash_b);
    }

    #[test]
    fn test_rounds_embedded_in_hash() {
        // A hash created at one cost still verifies after the default changes
        let (hash, salt) = hash_password("pw", 500);
        assert!(verify_password("pw", &hash, &salt));
    }

    #[test]
    fn test_malformed_stored_values() {
        let (_, salt) = hash_password("pw", TEST_ROUNDS);
        assert!(!verify_password("pw", "garbage", &salt));
        assert!(!verify_password("pw", "pbkdf2$notanumber$aa", &salt));
        assert!(!verify_password("pw", "pbkdf2$1000$zz", &salt));

        let (hash, _) = hash_password("pw", TEST_ROUNDS);
        assert!(!verify_password("pw", &hash, "not-hex"));
    }
}
