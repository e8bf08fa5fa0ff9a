//! Refresh flow
//!
//! Rotates a refresh token in place: same row, same session id, new secret,
//! new access-token jti, advanced rolling expiry. The old hash acts as an
//! optimistic-concurrency predicate, so concurrent refreshes of the same
//! session produce exactly one winner.

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};
use uuid::Uuid;

use session_common::{AppError, AppResult, IssuedAccessToken, TokenCodec};
use session_core::{clamp_rolling, DomainError, UnitOfWork};

use crate::dto::{RefreshRequest, RefreshResponse};

use super::context::ServiceContext;

/// Result of a successful rotation
struct Rotated {
    issued: IssuedAccessToken,
    secret: String,
    perso_id: Uuid,
}

/// Refresh flow
pub struct RefreshService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RefreshService<'a> {
    /// Create a new RefreshService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Rotate the presented refresh token and re-issue the access token
    #[instrument(skip(self, cancel, request), fields(session_id = %request.session_id))]
    pub async fn refresh(
        &self,
        cancel: &CancellationToken,
        request: RefreshRequest,
    ) -> AppResult<RefreshResponse> {
        if request.refresh_token.trim().is_empty() {
            return Err(AppError::validation("Refresh token is required"));
        }

        let mut uow = self.ctx.pipeline().begin().await?;
        let rotated = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(AppError::RequestCanceled),
            result = self.rotate(uow.as_mut(), &request) => result,
        };
        let rotated = self.ctx.pipeline().finish(uow, rotated).await?;

        // Best-effort: the superseded access token dies now instead of at
        // its natural expiry. Failure never fails the refresh.
        if let Some(token) = &request.current_access_token {
            self.ctx.blacklist_access_token(token).await;
        }

        info!(
            perso_id = %rotated.perso_id,
            session_id = %request.session_id,
            "Refresh token rotated"
        );

        Ok(RefreshResponse {
            access_token: rotated.issued.token,
            refresh_token: rotated.secret,
            token_type: "Bearer".to_string(),
            expires_in: rotated.issued.expires_in,
            session_id: request.session_id,
        })
    }

    async fn rotate(
        &self,
        uow: &mut dyn UnitOfWork,
        request: &RefreshRequest,
    ) -> AppResult<Rotated> {
        let now = Utc::now();
        let presented_hash = TokenCodec::hash_refresh_secret(&request.refresh_token);

        // Replay detection: a rotated-out or revoked hash no longer matches
        // any Active row
        let row = uow
            .get_active_by_hash_for_update(request.session_id, &presented_hash)
            .await?
            .ok_or(AppError::InvalidRefreshToken)?;

        let user = uow
            .find_by_id(row.perso_id)
            .await?
            .ok_or(AppError::RefreshUserNotFound)?;

        // Session identity is stable across rotations
        let issued = self
            .ctx
            .token_codec()
            .mint_access_for_session(user.perso_id, row.session_id)?;

        // Rolling advances; the absolute ceiling fixed at login never does
        let new_rolling = clamp_rolling(now + self.ctx.rolling_window(), row.expires_absolute);

        let mut secret = TokenCodec::generate_refresh_secret();
        let mut new_hash = TokenCodec::hash_refresh_secret(&secret);

        let rows = match uow
            .rotate_in_place(row.token_id, &row.hashed_token, &new_hash, issued.jti, new_rolling)
            .await
        {
            Ok(rows) => rows,
            // Regenerate and retry exactly once; a second collision escalates
            Err(DomainError::TokenHashCollision) => {
                secret = TokenCodec::generate_refresh_secret();
                new_hash = TokenCodec::hash_refresh_secret(&secret);
                uow.rotate_in_place(
                    row.token_id,
                    &row.hashed_token,
                    &new_hash,
                    issued.jti,
                    new_rolling,
                )
                .await?
            }
            Err(err) => return Err(err.into()),
        };

        match rows {
            // Another refresh already won the compare-and-swap; fail
            // cleanly, never retry with stale state
            0 => Err(AppError::InvalidRefreshToken),
            1 => Ok(Rotated {
                issued,
                secret,
                perso_id: user.perso_id,
            }),
            n => {
                error!(
                    token_id = row.token_id,
                    rows_affected = n,
                    "Rotation affected more than one row"
                );
                Err(AppError::internal(anyhow::anyhow!(
                    "rotation affected {n} rows"
                )))
            }
        }
    }
}
