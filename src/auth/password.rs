//! Password hashing and verification.
//!
//! Uses bcrypt, a slow adaptive hash; the mismatch position never affects
//! timing because the comparison happens inside the hash library. Neither
//! function logs its inputs.

use crate::domain::error::{AuthError, Result};

/// bcrypt cost factor for newly hashed passwords.
pub const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::internal(format!("Password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored hash.
///
/// An unparseable hash verifies as `false` rather than erroring, so a
/// corrupted record behaves like a wrong password.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("correct horse battery").expect("hash");
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn bad_hash_verifies_false() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same input").expect("hash");
        let b = hash_password("same input").expect("hash");
        assert_ne!(a, b);
    }
}
