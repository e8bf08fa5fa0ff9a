//! # session-cache
//!
//! Redis layer for the session engine: access-token blacklist and the
//! forced-logout push channel.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Blacklist**: TTL-keyed set of revoked access-token ids
//! - **Push**: Fire-and-forget forced-logout fan-out over Pub/Sub
//!
//! ## Example
//!
//! ```ignore
//! use session_cache::{RedisPool, RedisPoolConfig, RedisBlacklist, RedisPushChannel};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//!
//! let blacklist = RedisBlacklist::new(pool.clone());
//! blacklist.add(jti, remaining_lifetime).await?;
//!
//! let push = RedisPushChannel::new(pool);
//! push.send(perso_id, session_id, &PushMessage::forced_logout("session-expired")).await?;
//! ```

pub mod blacklist;
pub mod pool;
pub mod push;

// Re-export pool types
pub use pool::{
    create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
};

// Re-export store types
pub use blacklist::{blacklist_key, RedisBlacklist};
pub use push::{session_channel, RedisPushChannel};
