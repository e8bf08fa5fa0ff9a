//! Expiry sweeper entry point
//!
//! Run with:
//! ```bash
//! cargo run -p session-sweeper
//! ```
//!
//! Periodically deletes refresh-token rows whose rolling expiry has passed,
//! after force-logging-out their owners over the push channel.
//! Configuration is loaded from environment variables.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use session_cache::{RedisPool, RedisPushChannel};
use session_common::{try_init_tracing, AppConfig, TracingConfig};
use session_db::{create_pool, DatabaseConfig, PgDatabase};
use session_service::ExpirySweeper;

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(config).await {
        error!(error = %e, "Sweeper failed to start");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting expiry sweeper...");

    info!(
        env = ?config.app.env,
        interval_seconds = config.sweeper.interval_seconds,
        batch_size = config.sweeper.batch_size,
        "Configuration loaded"
    );

    let pool = create_pool(&DatabaseConfig::from(&config.database)).await?;
    let database = Arc::new(PgDatabase::new(pool));

    let redis_pool = RedisPool::from_config(&config.redis)?;
    redis_pool.health_check().await?;
    let push = Arc::new(RedisPushChannel::new(redis_pool));

    let sweeper = ExpirySweeper::new(database, push, config.sweeper.clone());

    let cancel = CancellationToken::new();
    let sweep_handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move { sweeper.run(cancel).await })
    };

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    cancel.cancel();
    sweep_handle.await?;

    info!("Expiry sweeper stopped");
    Ok(())
}
