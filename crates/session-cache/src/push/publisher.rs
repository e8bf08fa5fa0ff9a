//! Redis Pub/Sub push channel.
//!
//! Publishes forced-logout notifications to per-session channels. Delivery is
//! fire-and-forget: a zero receiver count only means no client is currently
//! subscribed.

use async_trait::async_trait;
use uuid::Uuid;

use session_core::{DomainError, PushChannel, PushMessage, RepoResult};

use crate::pool::RedisPool;

/// Channel prefix for per-session push channels
const SESSION_CHANNEL_PREFIX: &str = "session:";

/// Build the channel name for a `(perso_id, session_id)` pair
#[must_use]
pub fn session_channel(perso_id: Uuid, session_id: Uuid) -> String {
    format!("{SESSION_CHANNEL_PREFIX}{perso_id}:{session_id}")
}

/// Redis implementation of [`PushChannel`]
#[derive(Clone)]
pub struct RedisPushChannel {
    pool: RedisPool,
}

impl RedisPushChannel {
    /// Create a new push channel publisher
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PushChannel for RedisPushChannel {
    async fn send(
        &self,
        perso_id: Uuid,
        session_id: Uuid,
        message: &PushMessage,
    ) -> RepoResult<()> {
        let channel = session_channel(perso_id, session_id);
        let payload =
            serde_json::to_string(message).map_err(|e| DomainError::PushError(e.to_string()))?;

        let receivers = self
            .pool
            .publish(&channel, &payload)
            .await
            .map_err(|e| DomainError::PushError(e.to_string()))?;

        tracing::debug!(
            channel = %channel,
            event = %message.event,
            receivers = receivers,
            "Published push message"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_channel_format() {
        let perso_id = Uuid::nil();
        let session_id = Uuid::nil();
        assert_eq!(
            session_channel(perso_id, session_id),
            "session:00000000-0000-0000-0000-000000000000:00000000-0000-0000-0000-000000000000"
        );
    }
}
