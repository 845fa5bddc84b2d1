//! services/reader/src/adapters/hasher.rs
//!
//! Argon2id implementation of the `CredentialHasher` port.
//! Hashes are stored as PHC strings, so the salt and parameters travel with them.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use manhua_core::ports::{CredentialHasher, HashError};
use tracing::error;

pub struct Argon2Hasher {
    argon2: Argon2<'static>,
    /// A real hash of a random value, verified against for unknown emails.
    dummy_hash: String,
}

impl Argon2Hasher {
    pub fn new() -> Result<Self, HashError> {
        let argon2 = Argon2::default();
        let filler = uuid::Uuid::new_v4().to_string();
        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2
            .hash_password(filler.as_bytes(), &salt)
            .map_err(|e| HashError(e.to_string()))?
            .to_string();
        Ok(Self { argon2, dummy_hash })
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                error!("Failed to hash secret: {:?}", e);
                HashError(e.to_string())
            })
    }

    fn verify(&self, secret: &str, stored_hash: &str) -> bool {
        let parsed = match PasswordHash::new(stored_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!("Failed to parse stored hash: {:?}", e);
                return false;
            }
        };
        self.argon2
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }

    fn verify_dummy(&self, secret: &str) {
        let _ = self.verify(secret, &self.dummy_hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_and_verify() {
        let hasher = Argon2Hasher::new().unwrap();
        let a = hasher.hash("admin").unwrap();
        let b = hasher.hash("admin").unwrap();

        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
        assert!(!a.contains("admin"));
        assert!(hasher.verify("admin", &a));
        assert!(hasher.verify("admin", &b));
        assert!(!hasher.verify("Admin", &a));
    }

    #[test]
    fn plaintext_or_garbage_hash_never_verifies() {
        let hasher = Argon2Hasher::new().unwrap();
        assert!(!hasher.verify("admin", "admin"));
        assert!(!hasher.verify("", ""));
    }
}
