//! Domain entities - core business objects

mod session;
mod user;

pub use session::{clamp_rolling, Session, SessionStatus};
pub use user::{normalize_email, User};
