//! HS256 JWT による CredentialVerifier 実装

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, CredentialVerifier, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub iat: u64,
    pub exp: u64,
}

pub struct JwtCredentialVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtCredentialVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    /// Issue a token for `user_id` valid for `ttl` from now.
    pub fn issue_token(&self, user_id: &UserId, ttl: Duration) -> Result<String, AuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| AuthError::IssueFailed("system clock is before UNIX epoch".to_string()))?
            .as_secs();
        self.sign(&Claims {
            user_id: user_id.as_str().to_string(),
            iat: now,
            exp: now + ttl.as_secs(),
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| AuthError::IssueFailed(format!("JWT encode error: {e}")))
    }
}

impl CredentialVerifier for JwtCredentialVerifier {
    fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }

        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => {
                    tracing::debug!("Rejected credential: {}", e);
                    AuthError::InvalidToken
                }
            }
        })?;

        UserId::new(data.claims.user_id).map_err(|_| AuthError::InvalidToken)
    }
}
