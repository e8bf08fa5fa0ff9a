//! Store implementations
//!
//! PostgreSQL implementations of the store traits defined in session-core,
//! exposed through an explicit unit of work (one transaction per flow).

mod error;
mod unit_of_work;

pub use unit_of_work::{PgDatabase, PgUnitOfWork};
