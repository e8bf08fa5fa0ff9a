//! Session entity - one refresh-token row per logical device/browser login

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a session row.
///
/// A session transitions Active -> Revoked exactly once and never reverts.
/// Rows past both expiries are deleted outright by the sweeper, not
/// soft-revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Revoked,
}

/// Refresh-token row. The `session_id` is stable across rotations of the
/// same login; rotation mutates `hashed_token`, `access_token_jti`, and
/// `expires_rolling` in place on the same `token_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token_id: i64,
    pub perso_id: Uuid,
    pub session_id: Uuid,
    /// SHA-256 digest of the opaque secret. Unique across all rows.
    pub hashed_token: String,
    /// jti of the access token currently paired with this refresh token.
    pub access_token_jti: Uuid,
    pub expires_rolling: DateTime<Utc>,
    pub expires_absolute: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub is_persistent: bool,
    pub device_id: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Check if the rolling window has passed
    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_rolling
    }

    /// Check if the session is active (not revoked)
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active && self.revoked_at.is_none()
    }

    /// Check if the session can still be rotated at `now`
    #[inline]
    pub fn is_refreshable(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && !self.is_expired(now)
    }
}

/// Clamp a rolling expiry to the absolute ceiling.
///
/// The rolling window may never outlive the absolute ceiling fixed at login:
/// the stored rolling expiry is always `min(rolling, absolute)`.
#[inline]
pub fn clamp_rolling(rolling: DateTime<Utc>, absolute: DateTime<Utc>) -> DateTime<Utc> {
    rolling.min(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_session(now: DateTime<Utc>) -> Session {
        Session {
            token_id: 1,
            perso_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            hashed_token: "deadbeef".into(),
            access_token_jti: Uuid::new_v4(),
            expires_rolling: now + Duration::days(7),
            expires_absolute: now + Duration::days(30),
            revoked_at: None,
            status: SessionStatus::Active,
            is_persistent: false,
            device_id: None,
            user_agent: None,
            created_at: now,
        }
    }

    #[test]
    fn test_clamp_rolling() {
        let now = Utc::now();
        let absolute = now + Duration::days(30);

        // Under the ceiling: unchanged
        let rolling = now + Duration::days(7);
        assert_eq!(clamp_rolling(rolling, absolute), rolling);

        // Over the ceiling: clamped
        let rolling = now + Duration::days(45);
        assert_eq!(clamp_rolling(rolling, absolute), absolute);

        // Exactly at the ceiling
        assert_eq!(clamp_rolling(absolute, absolute), absolute);
    }

    #[test]
    fn test_is_refreshable() {
        let now = Utc::now();
        let mut session = sample_session(now);
        assert!(session.is_refreshable(now));

        session.expires_rolling = now - Duration::seconds(1);
        assert!(!session.is_refreshable(now));

        let mut session = sample_session(now);
        session.status = SessionStatus::Revoked;
        session.revoked_at = Some(now);
        assert!(!session.is_refreshable(now));
    }
}
