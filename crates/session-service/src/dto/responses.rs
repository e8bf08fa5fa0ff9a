//! Response DTOs for the session flows
//!
//! The refresh token in these responses is the opaque secret itself; only
//! its hash is ever stored, and the value is never logged.

use serde::Serialize;
use uuid::Uuid;

/// Successful login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Opaque refresh secret (never the hash)
    pub refresh_token: String,
    pub token_type: String,
    /// Access-token lifetime in seconds
    pub expires_in: i64,
    pub session_id: Uuid,
    /// HMAC binding `(perso_id, session_id)` for push-channel authentication
    pub channel_mac: String,
}

/// Successful refresh response. The session id is unchanged: rotation
/// replaces the secret on the same row.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub session_id: Uuid,
}
