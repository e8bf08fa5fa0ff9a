//! Session flows
//!
//! Each flow runs inside the transaction pipeline and returns typed
//! `AppResult` values; business decisions never travel as exceptions.

mod context;
mod login;
mod logout;
mod pipeline;
mod refresh;
mod sweeper;

pub use context::ServiceContext;
pub use login::LoginService;
pub use logout::LogoutService;
pub use pipeline::TransactionPipeline;
pub use refresh::RefreshService;
pub use sweeper::{ExpirySweeper, SweepStats};
