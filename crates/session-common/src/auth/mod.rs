//! Authentication primitives: token codec, credential verification,
//! and the lockout policy.

mod lockout;
mod password;
mod token;

pub use lockout::LockoutPolicy;
pub use password::{hash_password, verify_password, CredentialVerifier};
pub use token::{AccessClaims, IssuedAccessToken, TokenCodec};
