//! Push-channel fan-out

mod publisher;

pub use publisher::{session_channel, RedisPushChannel};
