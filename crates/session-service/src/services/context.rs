//! Service context - dependency container for the session flows
//!
//! Holds the database, cache collaborators, token codec, and policy objects
//! needed by the flows.

use std::sync::Arc;

use chrono::Duration;
use tracing::warn;
use uuid::Uuid;

use session_common::{
    CaptchaConfig, CredentialVerifier, LockoutPolicy, TokenCodec, TokenConfig,
};
use session_core::{CaptchaVerifier, Database, PushChannel, TokenBlacklist};

use super::pipeline::TransactionPipeline;

/// Service context containing all flow dependencies
///
/// This is the main dependency container that gets passed to all flows.
/// It provides access to:
/// - The database (via the transaction pipeline)
/// - The access-token blacklist and push channel
/// - The token codec and credential verifier
/// - Policy configuration (lockout, refresh windows, captcha test mode)
#[derive(Clone)]
pub struct ServiceContext {
    database: Arc<dyn Database>,
    blacklist: Arc<dyn TokenBlacklist>,
    push: Arc<dyn PushChannel>,
    captcha: Arc<dyn CaptchaVerifier>,

    token_codec: Arc<TokenCodec>,
    credential_verifier: CredentialVerifier,
    lockout_policy: LockoutPolicy,

    token_config: TokenConfig,
    captcha_config: CaptchaConfig,

    pipeline: TransactionPipeline,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        database: Arc<dyn Database>,
        blacklist: Arc<dyn TokenBlacklist>,
        push: Arc<dyn PushChannel>,
        captcha: Arc<dyn CaptchaVerifier>,
        token_codec: Arc<TokenCodec>,
        credential_verifier: CredentialVerifier,
        lockout_policy: LockoutPolicy,
        token_config: TokenConfig,
        captcha_config: CaptchaConfig,
    ) -> Self {
        let pipeline = TransactionPipeline::new(Arc::clone(&database));

        Self {
            database,
            blacklist,
            push,
            captcha,
            token_codec,
            credential_verifier,
            lockout_policy,
            token_config,
            captcha_config,
            pipeline,
        }
    }

    /// Get the database
    pub fn database(&self) -> &Arc<dyn Database> {
        &self.database
    }

    /// Get the access-token blacklist
    pub fn blacklist(&self) -> &dyn TokenBlacklist {
        self.blacklist.as_ref()
    }

    /// Get the push channel
    pub fn push(&self) -> &Arc<dyn PushChannel> {
        &self.push
    }

    /// Get the captcha verifier
    pub fn captcha(&self) -> &dyn CaptchaVerifier {
        self.captcha.as_ref()
    }

    /// Get the token codec
    pub fn token_codec(&self) -> &TokenCodec {
        self.token_codec.as_ref()
    }

    /// Get the credential verifier
    pub fn credential_verifier(&self) -> &CredentialVerifier {
        &self.credential_verifier
    }

    /// Get the lockout policy
    pub fn lockout_policy(&self) -> LockoutPolicy {
        self.lockout_policy
    }

    /// Rolling refresh window, extended on each refresh
    pub fn rolling_window(&self) -> Duration {
        Duration::days(self.token_config.rolling_window_days)
    }

    /// Absolute ceiling, fixed at login
    pub fn absolute_window(&self) -> Duration {
        Duration::days(self.token_config.absolute_window_days)
    }

    /// Get the captcha configuration
    pub fn captcha_config(&self) -> &CaptchaConfig {
        &self.captcha_config
    }

    /// Get the transaction pipeline
    pub fn pipeline(&self) -> &TransactionPipeline {
        &self.pipeline
    }

    /// Best-effort blacklisting of an access token for its remaining
    /// lifetime. Failures are logged and swallowed: a missed blacklist entry
    /// only means the token dies at its natural expiry.
    pub async fn blacklist_access_token(&self, token: &str) {
        let claims = match self.token_codec.decode_access_lenient(token) {
            Ok(claims) => claims,
            Err(_) => {
                warn!("Undecodable access token supplied for blacklisting, skipped");
                return;
            }
        };

        let ttl = claims.remaining_lifetime(chrono::Utc::now());
        if ttl.is_zero() {
            return;
        }

        if let Err(err) = self.blacklist.add(claims.jti, ttl).await {
            warn!(jti = %claims.jti, error = %err, "Failed to blacklist access token");
        }
    }

    /// Check whether an access token id has been blacklisted
    pub async fn is_blacklisted(&self, jti: Uuid) -> bool {
        match self.blacklist.contains(jti).await {
            Ok(found) => found,
            Err(err) => {
                warn!(%jti, error = %err, "Blacklist lookup failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("token_codec", &self.token_codec)
            .field("lockout_policy", &self.lockout_policy)
            .finish_non_exhaustive()
    }
}
