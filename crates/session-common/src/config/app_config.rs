//! Application configuration structs
//!
//! Loads configuration from environment variables (a `.env` file is picked
//! up when present).

use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub token: TokenConfig,
    pub lockout: LockoutConfig,
    pub captcha: CaptchaConfig,
    pub sweeper: SweeperConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Token configuration: access-token signing plus the refresh windows
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub secret: String,
    /// Access-token lifetime in seconds
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
    /// Rolling refresh window in days, extended on each refresh
    #[serde(default = "default_rolling_window_days")]
    pub rolling_window_days: i64,
    /// Absolute ceiling in days, fixed at login and never extended
    #[serde(default = "default_absolute_window_days")]
    pub absolute_window_days: i64,
}

/// Lockout policy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LockoutConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_window_minutes")]
    pub window_minutes: i64,
    #[serde(default = "default_lockout_minutes")]
    pub lockout_minutes: i64,
}

/// CAPTCHA configuration. The bypass applies only when `test_mode` is set
/// AND the login email equals `test_email` - never otherwise.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CaptchaConfig {
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default)]
    pub test_email: Option<String>,
}

/// Expiry sweeper configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SweeperConfig {
    #[serde(default = "default_sweep_interval")]
    pub interval_seconds: u64,
    #[serde(default = "default_sweep_batch_size")]
    pub batch_size: i64,
}

// Default value functions
fn default_app_name() -> String {
    "session-engine".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_access_token_expiry() -> i64 {
    900 // 15 minutes
}

fn default_rolling_window_days() -> i64 {
    7
}

fn default_absolute_window_days() -> i64 {
    30
}

fn default_max_attempts() -> u32 {
    5
}

fn default_window_minutes() -> i64 {
    15
}

fn default_lockout_minutes() -> i64 {
    15
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_sweep_batch_size() -> i64 {
    1000
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: env_parse("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: env_parse("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").map_err(|_| ConfigError::MissingVar("REDIS_URL"))?,
                max_connections: env_parse("REDIS_MAX_CONNECTIONS", default_redis_max_connections)?,
            },
            token: TokenConfig {
                secret: env::var("TOKEN_SECRET").map_err(|_| ConfigError::MissingVar("TOKEN_SECRET"))?,
                access_token_expiry: env_parse("ACCESS_TOKEN_EXPIRY", default_access_token_expiry)?,
                rolling_window_days: env_parse("REFRESH_ROLLING_WINDOW_DAYS", default_rolling_window_days)?,
                absolute_window_days: env_parse("REFRESH_ABSOLUTE_WINDOW_DAYS", default_absolute_window_days)?,
            },
            lockout: LockoutConfig {
                max_attempts: env_parse("LOCKOUT_MAX_ATTEMPTS", default_max_attempts)?,
                window_minutes: env_parse("LOCKOUT_WINDOW_MINUTES", default_window_minutes)?,
                lockout_minutes: env_parse("LOCKOUT_MINUTES", default_lockout_minutes)?,
            },
            captcha: CaptchaConfig {
                test_mode: env::var("CAPTCHA_TEST_MODE")
                    .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
                test_email: env::var("CAPTCHA_TEST_EMAIL").ok(),
            },
            sweeper: SweeperConfig {
                interval_seconds: env_parse("SWEEPER_INTERVAL_SECONDS", default_sweep_interval)?,
                batch_size: env_parse("SWEEPER_BATCH_SIZE", default_sweep_batch_size)?,
            },
        })
    }
}

/// Parse an env var, falling back to the default only when it is unset.
/// A value that is present but malformed is an error, not a silent default.
fn env_parse<T: std::str::FromStr>(
    key: &'static str,
    default: fn() -> T,
) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        Err(_) => Ok(default()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
