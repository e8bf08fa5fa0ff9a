//! Application error types
//!
//! Business failures (invalid captcha, lockout, bad credentials, invalid
//! refresh token) are plain values of this enum and flow through the
//! pipeline unchanged. Infrastructure failures are wrapped in `Internal`,
//! whose Display is a fixed generic message: raw exception text, SQL error
//! numbers, and token material never reach a caller.

use session_core::DomainError;
use std::fmt;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Business failures (always returned as values, never thrown)
    #[error("Invalid captcha")]
    InvalidCaptcha,

    #[error("Account is temporarily locked")]
    UserLockedOut,

    #[error("Email address not confirmed")]
    EmailNotConfirmed,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Refresh token owner no longer exists")]
    RefreshUserNotFound,

    // Access-token validation
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    TokenRevoked,

    // Validation errors (rejected before any I/O)
    #[error("Validation error: {0}")]
    Validation(String),

    // Cancellation (reported distinctly from other failures)
    #[error("Request was canceled")]
    RequestCanceled,

    // Infrastructure errors (generic Display; detail only via source)
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::InvalidCaptcha
            | Self::InvalidCredentials
            | Self::EmailNotConfirmed
            | Self::InvalidRefreshToken
            | Self::RefreshUserNotFound
            | Self::InvalidToken
            | Self::TokenExpired
            | Self::TokenRevoked => 401,
            Self::UserLockedOut => 423,
            Self::RequestCanceled => 499,
            Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCaptcha => "INVALID_CAPTCHA",
            Self::UserLockedOut => "USER_LOCKED_OUT",
            Self::EmailNotConfirmed => "EMAIL_NOT_CONFIRMED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::RefreshUserNotFound => "REFRESH_USER_NOT_FOUND",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::RequestCanceled => "REQUEST_CANCELED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a business-level failure (a decision, not a fault)
    #[must_use]
    pub fn is_business(&self) -> bool {
        !matches!(self, Self::Internal(_) | Self::RequestCanceled)
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            // Replay detection and lost rotations both surface to the caller
            // as an invalid refresh token.
            DomainError::SessionNotFound | DomainError::RotationConflict => {
                Self::InvalidRefreshToken
            }
            DomainError::UserNotFound(_) => Self::RefreshUserNotFound,
            DomainError::ValidationError(msg) => Self::Validation(msg),
            // A collision that survived the retry, and all infrastructure
            // failures, are genericised.
            DomainError::TokenHashCollision
            | DomainError::DatabaseError(_)
            | DomainError::CacheError(_)
            | DomainError::PushError(_)
            | DomainError::InternalError(_) => Self::Internal(anyhow::anyhow!(err)),
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
