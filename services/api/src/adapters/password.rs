//! services/api/src/adapters/password.rs
//!
//! Argon2id implementation of the `CredentialHasher` port.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use gem_lab_core::ports::{CredentialHasher, PortError, PortResult};
use tracing::error;

/// Argon2id PHC string at the default parameters over a random salt and output.
const DECOY_DIGEST: &str = "$argon2id$v=19$m=19456,t=2,p=1$KJetw4hyjNGpHTDIaScqDg$6oWoHYblsaQRmxUJcOQJWHzLCUSWo8sXpxLbQEawio4";

/// Hashes with the default Argon2id parameters and a fresh salt per call.
/// The output is a PHC string, so the salt and parameters travel with it.
#[derive(Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> PortResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| {
                error!("Failed to hash password: {:?}", e);
                PortError::Unexpected("Failed to hash password".to_string())
            })?;
        Ok(hash.to_string())
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(digest) else {
            return false;
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok()
    }

    fn decoy_digest(&self) -> &str {
        DECOY_DIGEST
    }
}
