//! Request DTOs for the session flows
//!
//! All request DTOs implement `Deserialize`; login additionally implements
//! `Validate` for input validation before any I/O.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(length(min = 1, message = "Captcha token is required"))]
    pub captcha_token: String,

    #[serde(default)]
    pub remember_me: bool,

    pub device_id: Option<String>,
    pub user_agent: Option<String>,
    pub client_ip: Option<String>,
}

/// Token refresh request. The opaque token value comes from a cookie; the
/// current access token, when supplied, gets blacklisted after rotation.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
    pub session_id: Uuid,
    pub current_access_token: Option<String>,
    pub device_id: Option<String>,
    pub user_agent: Option<String>,
}

/// Logout request
#[derive(Debug, Clone, Deserialize)]
pub struct LogoutRequest {
    pub perso_id: Uuid,
    pub session_id: Uuid,
    /// Access token to blacklist for its remaining lifetime
    pub access_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let request = LoginRequest {
            email: "not-an-email".to_string(),
            password: "pw".to_string(),
            captcha_token: "token".to_string(),
            remember_me: false,
            device_id: None,
            user_agent: None,
            client_ip: None,
        };
        assert!(request.validate().is_err());

        let request = LoginRequest {
            email: "user@example.com".to_string(),
            ..request
        };
        assert!(request.validate().is_ok());
    }
}
