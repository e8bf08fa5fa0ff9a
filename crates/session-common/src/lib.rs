//! # session-common
//!
//! Shared utilities: configuration, the business error taxonomy, token
//! codec, credential verification, lockout policy, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    hash_password, verify_password, AccessClaims, CredentialVerifier, IssuedAccessToken,
    LockoutPolicy, TokenCodec,
};
pub use config::{
    AppConfig, AppSettings, CaptchaConfig, ConfigError, DatabaseConfig, Environment,
    LockoutConfig, RedisConfig, SweeperConfig, TokenConfig,
};
pub use error::{AppError, AppResult};
pub use telemetry::{try_init_tracing, TracingConfig, TracingError};
