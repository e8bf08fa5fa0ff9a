//! User entity - the account that owns sessions

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// User account as seen by the session engine.
///
/// Only the fields the login and refresh flows depend on are carried here;
/// profile data lives elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub perso_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub email_confirmed: bool,
    pub lockout_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with required fields
    pub fn new(perso_id: Uuid, email: String, password_hash: String) -> Self {
        Self {
            perso_id,
            email,
            password_hash,
            email_confirmed: false,
            lockout_until: None,
            created_at: Utc::now(),
        }
    }

    /// Check whether the account is locked out at `now`
    #[inline]
    pub fn is_locked_out(&self, now: DateTime<Utc>) -> bool {
        matches!(self.lockout_until, Some(until) if until > now)
    }

    /// Check whether a lockout exists but has already elapsed at `now`
    #[inline]
    pub fn has_stale_lockout(&self, now: DateTime<Utc>) -> bool {
        matches!(self.lockout_until, Some(until) if until <= now)
    }
}

/// Normalize an email address for lookups: trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_locked_out() {
        let now = Utc::now();
        let mut user = User::new(Uuid::new_v4(), "a@b.c".into(), "hash".into());
        assert!(!user.is_locked_out(now));

        user.lockout_until = Some(now + Duration::minutes(5));
        assert!(user.is_locked_out(now));
        assert!(!user.has_stale_lockout(now));

        user.lockout_until = Some(now - Duration::minutes(5));
        assert!(!user.is_locked_out(now));
        assert!(user.has_stale_lockout(now));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Foo@Example.COM "), "foo@example.com");
        assert_eq!(normalize_email("a@b.c"), "a@b.c");
    }
}
