//! # session-service
//!
//! Application layer for the session engine: the login, refresh, and logout
//! flows, the transaction pipeline that brackets them, and the background
//! expiry sweeper.

pub mod dto;
pub mod services;

pub use dto::{LoginRequest, LoginResponse, LogoutRequest, RefreshRequest, RefreshResponse};
pub use services::{
    ExpirySweeper, LoginService, LogoutService, RefreshService, ServiceContext, SweepStats,
    TransactionPipeline,
};
