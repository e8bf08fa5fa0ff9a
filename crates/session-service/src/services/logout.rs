//! Logout flow
//!
//! Revokes the session row and best-effort blacklists the access token so
//! it is rejected before its natural expiry. Revoking an already-revoked
//! session is an idempotent success.

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use session_common::{AppError, AppResult};
use session_core::UnitOfWork;

use crate::dto::LogoutRequest;

use super::context::ServiceContext;

/// Logout flow
pub struct LogoutService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LogoutService<'a> {
    /// Create a new LogoutService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Revoke the session and blacklist the access token
    #[instrument(skip(self, cancel, request), fields(perso_id = %request.perso_id, session_id = %request.session_id))]
    pub async fn logout(
        &self,
        cancel: &CancellationToken,
        request: LogoutRequest,
    ) -> AppResult<()> {
        let mut uow = self.ctx.pipeline().begin().await?;
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(AppError::RequestCanceled),
            result = self.revoke_session(uow.as_mut(), &request) => result,
        };
        let revoked = self.ctx.pipeline().finish(uow, result).await?;

        if let Some(token) = &request.access_token {
            self.ctx.blacklist_access_token(token).await;
        }

        info!(revoked_rows = revoked, "Logout completed");
        Ok(())
    }

    async fn revoke_session(
        &self,
        uow: &mut dyn UnitOfWork,
        request: &LogoutRequest,
    ) -> AppResult<u64> {
        let rows = uow.revoke(request.perso_id, request.session_id).await?;
        Ok(rows)
    }
}
