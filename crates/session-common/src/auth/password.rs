//! Password verification with timing-equalised failure paths
//!
//! Uses Argon2id (OWASP recommended). The unknown-user path verifies against
//! a fixed dummy hash so its latency is indistinguishable from a
//! wrong-password check, defending against user-enumeration timing attacks.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::AppError;

/// Hash a password using Argon2id
///
/// # Errors
/// Returns an error if hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))
}

/// Verify a password against a hash
///
/// # Errors
/// Returns an error if the hash is not a valid PHC string
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Credential verifier carrying the dummy hash used to equalise the
/// unknown-user path.
#[derive(Clone)]
pub struct CredentialVerifier {
    dummy_hash: String,
}

impl CredentialVerifier {
    /// Create a verifier, computing the dummy hash once up front.
    ///
    /// # Errors
    /// Returns an error if Argon2 hashing fails
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            dummy_hash: hash_password("session-engine-timing-equalizer")?,
        })
    }

    /// Verify a candidate password against an optional stored hash.
    ///
    /// When no stored hash exists (user lookup failed), the comparison still
    /// runs against the dummy hash and the result is unconditionally `false`:
    /// both failure paths pay one full Argon2 verification.
    pub fn verify_candidate(
        &self,
        password: &str,
        stored_hash: Option<&str>,
    ) -> Result<bool, AppError> {
        match stored_hash {
            Some(hash) => verify_password(password, hash),
            None => {
                let _ = verify_password(password, &self.dummy_hash)?;
                Ok(false)
            }
        }
    }
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier").finish_non_exhaustive()
    }
}
