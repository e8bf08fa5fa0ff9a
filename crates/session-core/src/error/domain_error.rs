//! Domain errors - error types for the store layer
//!
//! Expected races (hash collision, lost rotation) are typed variants here,
//! never panics or control-flow exceptions.

use thiserror::Error;
use uuid::Uuid;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Active session not found")]
    SessionNotFound,

    // =========================================================================
    // Expected Races
    // =========================================================================
    /// Unique violation on `hashed_token`. Astronomically unlikely, but the
    /// constraint exists and the caller retries exactly once.
    #[error("Refresh-token hash collided with an existing row")]
    TokenHashCollision,

    /// A rotate-in-place matched zero rows: a concurrent refresh already won
    /// the compare-and-swap on the old hash.
    #[error("Session rotation lost the compare-and-swap race")]
    RotationConflict,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Push channel error: {0}")]
    PushError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for logs and API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::SessionNotFound => "UNKNOWN_SESSION",
            Self::TokenHashCollision => "TOKEN_HASH_COLLISION",
            Self::RotationConflict => "ROTATION_CONFLICT",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::PushError(_) => "PUSH_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::SessionNotFound)
    }

    /// Check if this is an expected concurrency race
    pub fn is_race(&self) -> bool {
        matches!(self, Self::TokenHashCollision | Self::RotationConflict)
    }

    /// Check if this wraps an infrastructure failure
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::CacheError(_) | Self::PushError(_) | Self::InternalError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DomainError::TokenHashCollision.code(), "TOKEN_HASH_COLLISION");
        assert_eq!(DomainError::RotationConflict.code(), "ROTATION_CONFLICT");
        assert_eq!(DomainError::SessionNotFound.code(), "UNKNOWN_SESSION");
    }

    #[test]
    fn test_classification() {
        assert!(DomainError::UserNotFound(Uuid::nil()).is_not_found());
        assert!(DomainError::TokenHashCollision.is_race());
        assert!(DomainError::RotationConflict.is_race());
        assert!(DomainError::DatabaseError("down".into()).is_infrastructure());
        assert!(!DomainError::SessionNotFound.is_infrastructure());
    }
}
