//! Store traits and the explicit unit-of-work seam
//!
//! Every state-changing flow runs against a [`UnitOfWork`] obtained from
//! [`Database::begin`]: one transaction, released deterministically by
//! `commit` or `rollback` at the end of that flow. There is no ambient
//! transaction state; the unit of work is a value passed into each call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entities::{Session, User};
use crate::error::DomainError;

/// Result type for store operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Store
// ============================================================================

#[async_trait]
pub trait UserStore: Send {
    /// Find a user by normalized (trimmed, lower-cased) email
    async fn find_by_email(&mut self, normalized_email: &str) -> RepoResult<Option<User>>;

    /// Find a user by id
    async fn find_by_id(&mut self, perso_id: Uuid) -> RepoResult<Option<User>>;

    /// Record one failed login attempt for the normalized email
    async fn record_failed_attempt(&mut self, normalized_email: &str) -> RepoResult<()>;

    /// Count failed attempts for the normalized email since `since`
    async fn count_failed_attempts_since(
        &mut self,
        normalized_email: &str,
        since: DateTime<Utc>,
    ) -> RepoResult<i64>;

    /// Lock the account until the given instant
    async fn lock_until(&mut self, perso_id: Uuid, until: DateTime<Utc>) -> RepoResult<()>;

    /// Clear the failed-attempt counter for the normalized email
    async fn clear_failed_attempts(&mut self, normalized_email: &str) -> RepoResult<()>;

    /// Clear an elapsed lockout
    async fn unlock(&mut self, perso_id: Uuid) -> RepoResult<()>;
}

// ============================================================================
// Session Store
// ============================================================================

#[async_trait]
pub trait SessionStore: Send {
    /// Insert a new session row, returning its `token_id`.
    ///
    /// A unique violation on `hashed_token` surfaces as
    /// [`DomainError::TokenHashCollision`].
    async fn insert(&mut self, session: &Session) -> RepoResult<i64>;

    /// Revoke any active row for `(perso_id, session_id)`, returning the
    /// number of rows revoked.
    async fn revoke(&mut self, perso_id: Uuid, session_id: Uuid) -> RepoResult<u64>;

    /// Look up the active, non-expired row for `(session_id, hash)` with
    /// row-level locking sufficient to serialize concurrent refreshes of the
    /// same row (`SELECT ... FOR UPDATE` under the enclosing transaction).
    async fn get_active_by_hash_for_update(
        &mut self,
        session_id: Uuid,
        hashed_token: &str,
    ) -> RepoResult<Option<Session>>;

    /// Rotate the row in place, guarded by the old hash as an
    /// optimistic-concurrency predicate. Returns rows affected: exactly one
    /// on success, zero when a concurrent refresh already won the race.
    ///
    /// A unique violation on the new hash surfaces as
    /// [`DomainError::TokenHashCollision`].
    async fn rotate_in_place(
        &mut self,
        token_id: i64,
        old_hash: &str,
        new_hash: &str,
        new_jti: Uuid,
        new_rolling: DateTime<Utc>,
    ) -> RepoResult<u64>;

    /// Fetch a bounded batch of rows whose rolling expiry has passed
    async fn get_expired_batch(&mut self, limit: i64) -> RepoResult<Vec<Session>>;

    /// Delete a row by its current token hash
    async fn delete_by_hash(&mut self, hashed_token: &str) -> RepoResult<bool>;
}

// ============================================================================
// Unit of Work
// ============================================================================

/// One database transaction exposing both stores.
///
/// Consuming `commit`/`rollback` makes "use after end of scope" a compile
/// error rather than a runtime one.
#[async_trait]
pub trait UnitOfWork: UserStore + SessionStore + Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> RepoResult<()>;

    /// Roll the transaction back
    async fn rollback(self: Box<Self>) -> RepoResult<()>;
}

/// Factory for units of work. Read-only queries may bypass this entirely;
/// only operations explicitly run through a unit of work open a transaction.
#[async_trait]
pub trait Database: Send + Sync {
    /// Begin a new transaction
    async fn begin(&self) -> RepoResult<Box<dyn UnitOfWork>>;
}
