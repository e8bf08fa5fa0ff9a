//! External collaborator contracts consumed by the flows

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::stores::RepoResult;

// ============================================================================
// Access-token blacklist
// ============================================================================

/// TTL-keyed set of revoked access-token ids (jti). Entries are pure cache
/// entries: appended with a TTL equal to the token's remaining lifetime and
/// expired naturally, never updated in place.
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Add a jti with the given time-to-live
    async fn add(&self, jti: Uuid, ttl: Duration) -> RepoResult<()>;

    /// Check whether a jti is blacklisted
    async fn contains(&self, jti: Uuid) -> RepoResult<bool>;
}

// ============================================================================
// Push channel
// ============================================================================

/// Payload sent over the push channel when a session is terminated remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    /// Event type name (e.g., "FORCE_LOGOUT")
    pub event: String,
    /// Machine-readable reason (e.g., "session-expired")
    pub reason: String,
}

impl PushMessage {
    /// Forced-logout notification with the given reason
    #[must_use]
    pub fn forced_logout(reason: impl Into<String>) -> Self {
        Self {
            event: "FORCE_LOGOUT".to_string(),
            reason: reason.into(),
        }
    }
}

/// Fire-and-forget fan-out keyed by `(perso_id, session_id)`. No delivery
/// guarantee is consumed by the session engine.
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// Send a message to the client(s) attached to the session
    async fn send(&self, perso_id: Uuid, session_id: Uuid, message: &PushMessage)
        -> RepoResult<()>;
}

// ============================================================================
// CAPTCHA
// ============================================================================

/// External boolean oracle for CAPTCHA validation.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// Validate a captcha response token
    async fn verify(&self, token: &str) -> RepoResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forced_logout_payload() {
        let msg = PushMessage::forced_logout("session-expired");
        assert_eq!(msg.event, "FORCE_LOGOUT");
        assert_eq!(msg.reason, "session-expired");

        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("session-expired"));
    }
}
