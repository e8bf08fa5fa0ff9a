//! User row model

use chrono::{DateTime, Utc};
use session_core::User;
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the users table (session-relevant columns only)
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub perso_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub email_confirmed: bool,
    pub lockout_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            perso_id: row.perso_id,
            email: row.email,
            password_hash: row.password_hash,
            email_confirmed: row.email_confirmed,
            lockout_until: row.lockout_until,
            created_at: row.created_at,
        }
    }
}
