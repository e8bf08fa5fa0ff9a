//! # session-db
//!
//! PostgreSQL layer implementing the store traits from `session-core` via
//! SQLx. All state-changing operations run on an explicit unit of work (one
//! transaction per flow invocation), obtained from [`PgDatabase::begin`] and
//! released deterministically by commit or rollback.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use session_core::Database;
//! use session_db::{create_pool, DatabaseConfig, PgDatabase};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env();
//!     let pool = create_pool(&config).await?;
//!     let db = PgDatabase::new(pool);
//!
//!     let mut uow = db.begin().await?;
//!     // ... store calls on the unit of work ...
//!     uow.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, create_pool_from_env, DatabaseConfig, PgPool};
pub use repositories::{PgDatabase, PgUnitOfWork};
