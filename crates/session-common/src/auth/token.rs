//! Token codec: signed access tokens, opaque refresh secrets, and the
//! channel-binding MAC.
//!
//! Access tokens are HS256 JWTs carrying `{sub, sid, jti, iat, exp}`. The
//! refresh token is a 256-bit random opaque string; only its SHA-256 digest
//! is ever stored, so a database leak exposes no usable secrets.

use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Access-token claims. `sid` and `jti` are the only claims session logic
/// depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (owning user id)
    pub sub: Uuid,
    /// Session id, stable across rotations of the same login
    pub sid: Uuid,
    /// Unique token id, used as the blacklist key
    pub jti: Uuid,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    /// Check if the token is expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Expiry as a UTC instant
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Remaining lifetime at `now`, zero if already past
    #[must_use]
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> std::time::Duration {
        let secs = self.exp - now.timestamp();
        std::time::Duration::from_secs(secs.max(0) as u64)
    }
}

/// A freshly minted access token together with the claims the session
/// engine needs to persist.
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub jti: Uuid,
    pub session_id: Uuid,
    pub expires_at: DateTime<Utc>,
    /// Seconds until expiry, for the response body
    pub expires_in: i64,
}

/// Codec for all token material used by the session engine
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    mac_key: Vec<u8>,
    access_token_expiry: i64,
}

impl TokenCodec {
    /// Create a new codec with the given secret and access-token expiry
    /// in seconds
    #[must_use]
    pub fn new(secret: &str, access_token_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            mac_key: secret.as_bytes().to_vec(),
            access_token_expiry,
        }
    }

    /// Mint an access token for a brand-new login. This is what mints the
    /// fresh session id.
    pub fn mint_access(&self, perso_id: Uuid) -> Result<IssuedAccessToken, AppError> {
        self.mint_access_for_session(perso_id, Uuid::new_v4())
    }

    /// Mint an access token reusing an existing session id (refresh path:
    /// session identity is stable across rotations)
    pub fn mint_access_for_session(
        &self,
        perso_id: Uuid,
        session_id: Uuid,
    ) -> Result<IssuedAccessToken, AppError> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.access_token_expiry);
        let jti = Uuid::new_v4();

        let claims = AccessClaims {
            sub: perso_id,
            sid: session_id,
            jti,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to encode access token")))?;

        Ok(IssuedAccessToken {
            token,
            jti,
            session_id,
            expires_at,
            expires_in: self.access_token_expiry,
        })
    }

    /// Decode and validate an access token
    pub fn validate_access(&self, token: &str) -> Result<AccessClaims, AppError> {
        let validation = Validation::default();

        let token_data =
            decode::<AccessClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                    _ => AppError::InvalidToken,
                }
            })?;

        Ok(token_data.claims)
    }

    /// Decode an access token without requiring it to still be valid.
    ///
    /// Used when blacklisting the superseded token during refresh: the token
    /// being replaced may already be past its exp.
    pub fn decode_access_lenient(&self, token: &str) -> Result<AccessClaims, AppError> {
        let mut validation = Validation::default();
        validation.validate_exp = false;

        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims)
    }

    /// Generate a cryptographically random opaque refresh secret (256 bits)
    #[must_use]
    pub fn generate_refresh_secret() -> String {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Deterministic one-way hash of an opaque refresh secret for storage
    #[must_use]
    pub fn hash_refresh_secret(secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// HMAC binding `(perso_id, session_id)` for out-of-band channel
    /// authentication (e.g. the push channel handshake)
    #[must_use]
    pub fn channel_mac(&self, perso_id: Uuid, session_id: Uuid) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.mac_key)
            .expect("HMAC can take a key of any size");
        mac.update(format!("{perso_id}:{session_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_token_expiry", &self.access_token_expiry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_codec() -> TokenCodec {
        TokenCodec::new("test-secret-key-that-is-long-enough", 900)
    }

    #[test]
    fn test_mint_access_mints_fresh_session_id() {
        let codec = create_test_codec();
        let perso_id = Uuid::new_v4();

        let a = codec.mint_access(perso_id).unwrap();
        let b = codec.mint_access(perso_id).unwrap();

        assert_ne!(a.session_id, b.session_id);
        assert_ne!(a.jti, b.jti);
        assert_eq!(a.expires_in, 900);
    }

    #[test]
    fn test_session_id_stable_across_refresh_mint() {
        let codec = create_test_codec();
        let perso_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();

        let a = codec.mint_access_for_session(perso_id, session_id).unwrap();
        let b = codec.mint_access_for_session(perso_id, session_id).unwrap();

        assert_eq!(a.session_id, session_id);
        assert_eq!(b.session_id, session_id);
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_validate_access_roundtrip() {
        let codec = create_test_codec();
        let perso_id = Uuid::new_v4();

        let issued = codec.mint_access(perso_id).unwrap();
        let claims = codec.validate_access(&issued.token).unwrap();

        assert_eq!(claims.sub, perso_id);
        assert_eq!(claims.sid, issued.session_id);
        assert_eq!(claims.jti, issued.jti);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_invalid_token() {
        let codec = create_test_codec();
        let result = codec.validate_access("not.a.token");
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let codec = create_test_codec();
        let other = TokenCodec::new("a-completely-different-secret-key", 900);

        let issued = codec.mint_access(Uuid::new_v4()).unwrap();
        assert!(other.validate_access(&issued.token).is_err());
    }

    #[test]
    fn test_refresh_secret_and_hash() {
        let a = TokenCodec::generate_refresh_secret();
        let b = TokenCodec::generate_refresh_secret();

        assert_eq!(a.len(), 64); // 32 bytes hex
        assert_ne!(a, b);

        // Deterministic digest, and never equal to the secret itself
        assert_eq!(
            TokenCodec::hash_refresh_secret(&a),
            TokenCodec::hash_refresh_secret(&a)
        );
        assert_ne!(TokenCodec::hash_refresh_secret(&a), a);
    }

    #[test]
    fn test_channel_mac_binds_both_ids() {
        let codec = create_test_codec();
        let perso_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();

        let mac = codec.channel_mac(perso_id, session_id);
        assert_eq!(mac, codec.channel_mac(perso_id, session_id));
        assert_ne!(mac, codec.channel_mac(perso_id, Uuid::new_v4()));
        assert_ne!(mac, codec.channel_mac(Uuid::new_v4(), session_id));
    }

    #[test]
    fn test_remaining_lifetime() {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: Uuid::new_v4(),
            sid: Uuid::new_v4(),
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: now.timestamp() + 600,
        };

        let remaining = claims.remaining_lifetime(now);
        assert!(remaining.as_secs() >= 599 && remaining.as_secs() <= 600);

        let past = claims.remaining_lifetime(now + Duration::seconds(601));
        assert_eq!(past.as_secs(), 0);
    }
}
