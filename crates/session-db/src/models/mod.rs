//! Database models with SQLx `FromRow` derives

mod session;
mod user;

pub use session::{status_str, SessionRow};
pub use user::UserRow;
