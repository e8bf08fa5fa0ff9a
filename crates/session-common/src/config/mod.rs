//! Configuration loading

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, CaptchaConfig, ConfigError, DatabaseConfig, Environment,
    LockoutConfig, RedisConfig, SweeperConfig, TokenConfig,
};
