//! Redis-backed access-token blacklist.
//!
//! Revoked access-token ids (jti) are written as pure cache entries: one
//! `SETEX` with a TTL equal to the token's remaining lifetime, then left to
//! expire on their own. Nothing ever updates an entry in place.

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use session_core::{DomainError, RepoResult, TokenBlacklist};

use crate::pool::RedisPool;

/// Key prefix for blacklisted jtis
const BLACKLIST_PREFIX: &str = "blacklist:jti:";

/// Build the Redis key for a jti
#[must_use]
pub fn blacklist_key(jti: Uuid) -> String {
    format!("{BLACKLIST_PREFIX}{jti}")
}

/// Redis implementation of [`TokenBlacklist`]
#[derive(Clone)]
pub struct RedisBlacklist {
    pool: RedisPool,
}

impl RedisBlacklist {
    /// Create a new blacklist store
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenBlacklist for RedisBlacklist {
    async fn add(&self, jti: Uuid, ttl: Duration) -> RepoResult<()> {
        // A token already past its expiry needs no entry
        let ttl_seconds = ttl.as_secs();
        if ttl_seconds == 0 {
            return Ok(());
        }

        self.pool
            .set_ex(&blacklist_key(jti), "1", ttl_seconds)
            .await
            .map_err(|e| DomainError::CacheError(e.to_string()))?;

        tracing::debug!(%jti, ttl_seconds, "Access token blacklisted");
        Ok(())
    }

    async fn contains(&self, jti: Uuid) -> RepoResult<bool> {
        self.pool
            .exists(&blacklist_key(jti))
            .await
            .map_err(|e| DomainError::CacheError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blacklist_key_format() {
        let jti = Uuid::nil();
        assert_eq!(
            blacklist_key(jti),
            "blacklist:jti:00000000-0000-0000-0000-000000000000"
        );
    }
}
