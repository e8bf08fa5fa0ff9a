//! Login flow
//!
//! Orchestrates CAPTCHA, lockout, credential verification, session hygiene,
//! and token issuance. Runs as two units of work: the credential gate
//! commits even when the login is rejected (attempt accounting and lockout
//! must persist), while the issuance phase rolls back entirely on any
//! failure.

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use validator::Validate;

use session_common::{AppError, AppResult, IssuedAccessToken, TokenCodec};
use session_core::{
    clamp_rolling, DomainError, Session, SessionStatus, UnitOfWork, User,
};

use crate::dto::{LoginRequest, LoginResponse};

use super::context::ServiceContext;

/// Outcome of the credential gate
enum CredentialCheck {
    Verified(User),
    Rejected(AppError),
}

/// Login flow
pub struct LoginService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LoginService<'a> {
    /// Create a new LoginService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Authenticate and issue a new session
    #[instrument(skip(self, cancel, request), fields(email = %request.email))]
    pub async fn login(
        &self,
        cancel: &CancellationToken,
        request: LoginRequest,
    ) -> AppResult<LoginResponse> {
        request.validate().map_err(AppError::validation)?;
        let email = session_core::normalize_email(&request.email);

        self.check_captcha(&email, &request.captcha_token).await?;

        // Credential gate. This unit of work commits on a clean rejection
        // too: failed-attempt accounting and lockout must outlive the
        // failing request.
        let mut uow = self.ctx.pipeline().begin().await?;
        let check = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(AppError::RequestCanceled),
            result = self.verify_credentials(uow.as_mut(), &email, &request.password) => result,
        };
        let user = match self.ctx.pipeline().finish(uow, check).await? {
            CredentialCheck::Verified(user) => user,
            CredentialCheck::Rejected(err) => return Err(err),
        };

        // Issuance. Any failure here rolls back the whole unit of work.
        let mut uow = self.ctx.pipeline().begin().await?;
        let issued = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(AppError::RequestCanceled),
            result = self.issue_session(uow.as_mut(), &user, &email, &request) => result,
        };
        let (issued, refresh_secret) = self.ctx.pipeline().finish(uow, issued).await?;

        info!(
            perso_id = %user.perso_id,
            session_id = %issued.session_id,
            "Login succeeded"
        );

        Ok(LoginResponse {
            access_token: issued.token,
            refresh_token: refresh_secret,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
            session_id: issued.session_id,
            channel_mac: self
                .ctx
                .token_codec()
                .channel_mac(user.perso_id, issued.session_id),
        })
    }

    /// CAPTCHA gate. Bypassed only for the explicitly configured test
    /// address under the explicit test-mode flag, never otherwise.
    async fn check_captcha(&self, normalized_email: &str, token: &str) -> AppResult<()> {
        let config = self.ctx.captcha_config();
        if config.test_mode && config.test_email.as_deref() == Some(normalized_email) {
            return Ok(());
        }

        let valid = self.ctx.captcha().verify(token).await?;
        if valid {
            Ok(())
        } else {
            Err(AppError::InvalidCaptcha)
        }
    }

    /// Lockout check plus timing-equalised credential verification, with
    /// failed-attempt accounting on rejection.
    async fn verify_credentials(
        &self,
        uow: &mut dyn UnitOfWork,
        email: &str,
        password: &str,
    ) -> AppResult<CredentialCheck> {
        let now = Utc::now();
        let user = uow.find_by_email(email).await?;

        if let Some(user) = &user {
            if user.is_locked_out(now) {
                warn!(perso_id = %user.perso_id, "Login rejected: account locked out");
                return Ok(CredentialCheck::Rejected(AppError::UserLockedOut));
            }
            if user.has_stale_lockout(now) {
                uow.unlock(user.perso_id).await?;
            }
        }

        // Unknown users still pay one full hash verification
        let password_ok = self.ctx.credential_verifier().verify_candidate(
            password,
            user.as_ref().map(|u| u.password_hash.as_str()),
        )?;

        let Some(user) = user else {
            return Ok(CredentialCheck::Rejected(AppError::InvalidCredentials));
        };

        if password_ok && user.email_confirmed {
            return Ok(CredentialCheck::Verified(user));
        }

        uow.record_failed_attempt(email).await?;
        let policy = self.ctx.lockout_policy();
        let failed = uow
            .count_failed_attempts_since(email, policy.window_start(now))
            .await?;
        if policy.should_lock(failed) {
            uow.lock_until(user.perso_id, policy.lockout_until(now))
                .await?;
            warn!(
                perso_id = %user.perso_id,
                failed_attempts = failed,
                "Account locked after repeated failures"
            );
        }

        // The only distinction revealed to the caller: unconfirmed email
        // vs everything else
        let err = if password_ok {
            AppError::EmailNotConfirmed
        } else {
            AppError::InvalidCredentials
        };
        Ok(CredentialCheck::Rejected(err))
    }

    /// Mint tokens and insert the session row, with session hygiene and
    /// one regenerate-and-retry on a hash collision.
    async fn issue_session(
        &self,
        uow: &mut dyn UnitOfWork,
        user: &User,
        normalized_email: &str,
        request: &LoginRequest,
    ) -> AppResult<(IssuedAccessToken, String)> {
        let now = Utc::now();

        // Minting also mints the fresh session id
        let issued = self.ctx.token_codec().mint_access(user.perso_id)?;

        // Session hygiene: no stale Active row may linger under this id
        uow.revoke(user.perso_id, issued.session_id).await?;

        let expires_absolute = now + self.ctx.absolute_window();
        let expires_rolling = clamp_rolling(now + self.ctx.rolling_window(), expires_absolute);

        let mut secret = TokenCodec::generate_refresh_secret();
        let mut session = Session {
            token_id: 0,
            perso_id: user.perso_id,
            session_id: issued.session_id,
            hashed_token: TokenCodec::hash_refresh_secret(&secret),
            access_token_jti: issued.jti,
            expires_rolling,
            expires_absolute,
            revoked_at: None,
            status: SessionStatus::Active,
            is_persistent: request.remember_me,
            device_id: request.device_id.clone(),
            user_agent: request.user_agent.clone(),
            created_at: now,
        };

        match uow.insert(&session).await {
            Ok(_) => {}
            // Regenerate and retry exactly once; a second collision escalates
            Err(DomainError::TokenHashCollision) => {
                secret = TokenCodec::generate_refresh_secret();
                session.hashed_token = TokenCodec::hash_refresh_secret(&secret);
                uow.insert(&session).await?;
            }
            Err(err) => return Err(err.into()),
        }

        uow.clear_failed_attempts(normalized_email).await?;

        Ok((issued, secret))
    }
}
