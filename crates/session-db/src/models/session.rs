//! Refresh-token row model

use chrono::{DateTime, Utc};
use session_core::{Session, SessionStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the refresh_tokens table
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub token_id: i64,
    pub perso_id: Uuid,
    pub session_id: Uuid,
    pub hashed_token: String,
    pub access_token_jti: Uuid,
    pub expires_rolling: DateTime<Utc>,
    pub expires_absolute: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub status: String,
    pub is_persistent: bool,
    pub device_id: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        let status = match row.status.as_str() {
            "revoked" => SessionStatus::Revoked,
            _ => SessionStatus::Active,
        };

        Session {
            token_id: row.token_id,
            perso_id: row.perso_id,
            session_id: row.session_id,
            hashed_token: row.hashed_token,
            access_token_jti: row.access_token_jti,
            expires_rolling: row.expires_rolling,
            expires_absolute: row.expires_absolute,
            revoked_at: row.revoked_at,
            status,
            is_persistent: row.is_persistent,
            device_id: row.device_id,
            user_agent: row.user_agent,
            created_at: row.created_at,
        }
    }
}

/// Status column value for an entity status
pub fn status_str(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Active => "active",
        SessionStatus::Revoked => "revoked",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_str(SessionStatus::Active), "active");
        assert_eq!(status_str(SessionStatus::Revoked), "revoked");
    }

    #[test]
    fn test_row_to_entity() {
        let now = Utc::now();
        let row = SessionRow {
            token_id: 7,
            perso_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            hashed_token: "abc".into(),
            access_token_jti: Uuid::new_v4(),
            expires_rolling: now,
            expires_absolute: now,
            revoked_at: None,
            status: "active".into(),
            is_persistent: true,
            device_id: Some("dev".into()),
            user_agent: None,
            created_at: now,
        };

        let session: Session = row.into();
        assert_eq!(session.token_id, 7);
        assert_eq!(session.status, SessionStatus::Active);
        assert!(session.is_persistent);
    }
}
