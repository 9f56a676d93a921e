//! Argon2id password hashing adapter.
//!
//! Implements the domain's `PasswordHasher` port with the `argon2` crate's
//! default parameters and a fresh random salt per hash. Stored hashes are
//! PHC strings, so parameters can be tightened later without invalidating
//! existing credentials.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Argon2id-backed implementation of the password hashing port.
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, PasswordHashError> {
        let parsed =
            PasswordHash::new(password_hash).map_err(|err| PasswordHashError::hash(err.to_string()))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn hashing_produces_a_verifiable_phc_string() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash("correct horse battery staple").expect("hashes");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher
            .verify("correct horse battery staple", &hash)
            .expect("verifies"));
        assert!(!hasher.verify("wrong password", &hash).expect("verifies"));
    }

    #[rstest]
    fn salts_differ_between_hashes() {
        let hasher = Argon2PasswordHasher;
        let first = hasher.hash("same input").expect("hashes");
        let second = hasher.hash("same input").expect("hashes");
        assert_ne!(first, second);
    }

    #[rstest]
    fn garbage_stored_hash_is_an_error_not_a_mismatch() {
        let hasher = Argon2PasswordHasher;
        hasher
            .verify("anything", "not-a-phc-string")
            .expect_err("malformed hash");
    }
}
