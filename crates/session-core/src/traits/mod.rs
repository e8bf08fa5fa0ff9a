//! Store and collaborator traits (ports)
//!
//! The domain layer defines what it needs; the infrastructure crates
//! (`session-db`, `session-cache`) provide the implementations.

mod collaborators;
mod stores;

pub use collaborators::{CaptchaVerifier, PushChannel, PushMessage, TokenBlacklist};
pub use stores::{Database, RepoResult, SessionStore, UnitOfWork, UserStore};
