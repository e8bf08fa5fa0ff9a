//! Data transfer objects

mod requests;
mod responses;

pub use requests::{LoginRequest, LogoutRequest, RefreshRequest};
pub use responses::{LoginResponse, RefreshResponse};
