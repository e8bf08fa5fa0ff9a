//! Lockout policy - pure decision logic for failed-attempt accounting
//!
//! Given a rolling count of failed attempts inside a configured window,
//! decides whether an account locks and for how long. No I/O happens here;
//! the flows query the counts and apply the decisions.

use chrono::{DateTime, Duration, Utc};

use crate::config::LockoutConfig;

/// Lockout policy parameters
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    max_attempts: i64,
    window: Duration,
    lockout: Duration,
}

impl LockoutPolicy {
    /// Create a policy from explicit parameters
    #[must_use]
    pub fn new(max_attempts: u32, window_minutes: i64, lockout_minutes: i64) -> Self {
        Self {
            max_attempts: i64::from(max_attempts),
            window: Duration::minutes(window_minutes),
            lockout: Duration::minutes(lockout_minutes),
        }
    }

    /// Start of the counting window at `now`. Attempts before this instant
    /// do not count toward the current lockout.
    #[must_use]
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.window
    }

    /// Whether `failed_count` attempts inside the window lock the account
    #[must_use]
    pub fn should_lock(&self, failed_count: i64) -> bool {
        failed_count >= self.max_attempts
    }

    /// Lockout deadline when locking at `now`
    #[must_use]
    pub fn lockout_until(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.lockout
    }
}

impl From<&LockoutConfig> for LockoutPolicy {
    fn from(config: &LockoutConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.window_minutes,
            config.lockout_minutes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold() {
        let policy = LockoutPolicy::new(3, 1, 15);

        assert!(!policy.should_lock(0));
        assert!(!policy.should_lock(2));
        // The Nth failed attempt within the window locks
        assert!(policy.should_lock(3));
        assert!(policy.should_lock(4));
    }

    #[test]
    fn test_window_start() {
        let policy = LockoutPolicy::new(3, 15, 15);
        let now = Utc::now();
        assert_eq!(policy.window_start(now), now - Duration::minutes(15));
    }

    #[test]
    fn test_lockout_until() {
        let policy = LockoutPolicy::new(3, 1, 30);
        let now = Utc::now();
        assert_eq!(policy.lockout_until(now), now + Duration::minutes(30));
    }

    #[test]
    fn test_from_config() {
        let config = LockoutConfig {
            max_attempts: 5,
            window_minutes: 10,
            lockout_minutes: 20,
        };
        let policy = LockoutPolicy::from(&config);
        assert!(policy.should_lock(5));
        assert!(!policy.should_lock(4));
    }
}
