//! PostgreSQL unit of work
//!
//! [`PgDatabase::begin`] opens one transaction and hands back a
//! [`PgUnitOfWork`] implementing both store traits on top of it. Every store
//! call inside a flow runs on that same transaction; commit and rollback
//! consume the value, so the connection is always released exactly once.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;
use uuid::Uuid;

use session_core::{
    Database, DomainError, RepoResult, Session, SessionStore, UnitOfWork, User, UserStore,
};

use crate::models::{status_str, SessionRow, UserRow};

use super::error::{map_db_error, map_unique_violation};

/// Unit-of-work factory backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    /// Create a new PgDatabase
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Access the underlying pool (read-only paths that bypass the unit of
    /// work)
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn begin(&self) -> RepoResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await.map_err(map_db_error)?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// One open transaction exposing the user and session stores
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UserStore for PgUnitOfWork {
    #[instrument(skip(self))]
    async fn find_by_email(&mut self, normalized_email: &str) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserRow>(
            r"
            SELECT perso_id, email, password_hash, email_confirmed, lockout_until, created_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(normalized_email)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&mut self, perso_id: Uuid) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserRow>(
            r"
            SELECT perso_id, email, password_hash, email_confirmed, lockout_until, created_at
            FROM users
            WHERE perso_id = $1
            ",
        )
        .bind(perso_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn record_failed_attempt(&mut self, normalized_email: &str) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO login_attempts (email, attempted_at)
            VALUES ($1, NOW())
            ",
        )
        .bind(normalized_email)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn count_failed_attempts_since(
        &mut self,
        normalized_email: &str,
        since: DateTime<Utc>,
    ) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM login_attempts
            WHERE email = $1 AND attempted_at >= $2
            ",
        )
        .bind(normalized_email)
        .bind(since)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(count)
    }

    #[instrument(skip(self))]
    async fn lock_until(&mut self, perso_id: Uuid, until: DateTime<Utc>) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users SET lockout_until = $2 WHERE perso_id = $1
            ",
        )
        .bind(perso_id)
        .bind(until)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(perso_id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_failed_attempts(&mut self, normalized_email: &str) -> RepoResult<()> {
        sqlx::query(
            r"
            DELETE FROM login_attempts WHERE email = $1
            ",
        )
        .bind(normalized_email)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn unlock(&mut self, perso_id: Uuid) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users SET lockout_until = NULL WHERE perso_id = $1
            ",
        )
        .bind(perso_id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(perso_id));
        }

        Ok(())
    }
}

#[async_trait]
impl SessionStore for PgUnitOfWork {
    #[instrument(skip(self, session), fields(perso_id = %session.perso_id, session_id = %session.session_id))]
    async fn insert(&mut self, session: &Session) -> RepoResult<i64> {
        let token_id = sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO refresh_tokens
                (perso_id, session_id, hashed_token, access_token_jti,
                 expires_rolling, expires_absolute, status, is_persistent,
                 device_id, user_agent, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING token_id
            ",
        )
        .bind(session.perso_id)
        .bind(session.session_id)
        .bind(&session.hashed_token)
        .bind(session.access_token_jti)
        .bind(session.expires_rolling)
        .bind(session.expires_absolute)
        .bind(status_str(session.status))
        .bind(session.is_persistent)
        .bind(&session.device_id)
        .bind(&session.user_agent)
        .bind(session.created_at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::TokenHashCollision))?;

        Ok(token_id)
    }

    #[instrument(skip(self))]
    async fn revoke(&mut self, perso_id: Uuid, session_id: Uuid) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET status = 'revoked', revoked_at = NOW()
            WHERE perso_id = $1 AND session_id = $2 AND status = 'active'
            ",
        )
        .bind(perso_id)
        .bind(session_id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self, hashed_token))]
    async fn get_active_by_hash_for_update(
        &mut self,
        session_id: Uuid,
        hashed_token: &str,
    ) -> RepoResult<Option<Session>> {
        // FOR UPDATE serializes concurrent refreshes of the same row under
        // the enclosing transaction.
        let result = sqlx::query_as::<_, SessionRow>(
            r"
            SELECT token_id, perso_id, session_id, hashed_token, access_token_jti,
                   expires_rolling, expires_absolute, revoked_at, status,
                   is_persistent, device_id, user_agent, created_at
            FROM refresh_tokens
            WHERE session_id = $1
              AND hashed_token = $2
              AND status = 'active'
              AND expires_rolling > NOW()
            FOR UPDATE
            ",
        )
        .bind(session_id)
        .bind(hashed_token)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Session::from))
    }

    #[instrument(skip(self, old_hash, new_hash))]
    async fn rotate_in_place(
        &mut self,
        token_id: i64,
        old_hash: &str,
        new_hash: &str,
        new_jti: Uuid,
        new_rolling: DateTime<Utc>,
    ) -> RepoResult<u64> {
        // The old hash is the optimistic-concurrency predicate: zero rows
        // affected means another refresh already won this race.
        let result = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET hashed_token = $3, access_token_jti = $4, expires_rolling = $5
            WHERE token_id = $1 AND hashed_token = $2
            ",
        )
        .bind(token_id)
        .bind(old_hash)
        .bind(new_hash)
        .bind(new_jti)
        .bind(new_rolling)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::TokenHashCollision))?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn get_expired_batch(&mut self, limit: i64) -> RepoResult<Vec<Session>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r"
            SELECT token_id, perso_id, session_id, hashed_token, access_token_jti,
                   expires_rolling, expires_absolute, revoked_at, status,
                   is_persistent, device_id, user_agent, created_at
            FROM refresh_tokens
            WHERE expires_rolling <= NOW()
            ORDER BY expires_rolling
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Session::from).collect())
    }

    #[instrument(skip(self, hashed_token))]
    async fn delete_by_hash(&mut self, hashed_token: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM refresh_tokens WHERE hashed_token = $1
            ",
        )
        .bind(hashed_token)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> RepoResult<()> {
        self.tx.commit().await.map_err(map_db_error)
    }

    async fn rollback(self: Box<Self>) -> RepoResult<()> {
        self.tx.rollback().await.map_err(map_db_error)
    }
}
