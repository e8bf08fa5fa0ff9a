//! # session-core
//!
//! Domain layer for the session lifecycle engine: entities, domain errors,
//! and the store/collaborator traits (ports). This crate has zero
//! dependencies on infrastructure (database, cache, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;

// Re-export commonly used types at crate root
pub use entities::{clamp_rolling, normalize_email, Session, SessionStatus, User};
pub use error::DomainError;
pub use traits::{
    CaptchaVerifier, Database, PushChannel, PushMessage, RepoResult, SessionStore, TokenBlacklist,
    UnitOfWork, UserStore,
};
