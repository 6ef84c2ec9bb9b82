//! Connection Authenticator seam.

use super::{error::AuthError, value_object::UserId};

/// Verifies the bearer credential presented at connection time.
pub trait CredentialVerifier: Send + Sync {
    /// Decode and validate `token`, returning the embedded identity.
    fn verify(&self, token: &str) -> Result<UserId, AuthError>;
}
