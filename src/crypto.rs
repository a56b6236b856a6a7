//! Credential hashing.
//!
//! Submitted passwords are stored only as bcrypt hashes; the plaintext never
//! reaches the store and is never echoed back.

use crate::errors::ApiError;

/// bcrypt work factor for stored credentials.
const HASH_COST: u32 = 10;

pub fn hash_password(plain: &str) -> Result<String, ApiError> {
    Ok(bcrypt::hash(plain, HASH_COST)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_differs_from_plaintext_and_verifies() {
        let hash = hash_password("secreta123").unwrap();
        assert_ne!(hash, "secreta123");
        assert!(bcrypt::verify("secreta123", &hash).unwrap());
        assert!(!bcrypt::verify("otra", &hash).unwrap());
    }
}
