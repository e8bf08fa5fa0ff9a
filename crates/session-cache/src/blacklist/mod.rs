//! Access-token blacklist

mod redis_blacklist;

pub use redis_blacklist::{blacklist_key, RedisBlacklist};
