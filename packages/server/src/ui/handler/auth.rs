//! Bearer credential extraction.

use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
};

use crate::{
    domain::{AuthError, UserId},
    infrastructure::dto::http::ErrorResponse,
    ui::state::AppState,
};

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Verify a presented token, mapping every failure to 401.
pub fn authenticate(state: &AppState, token: Option<String>) -> Result<UserId, StatusCode> {
    let token = token.ok_or(AuthError::MissingToken).map_err(reject)?;
    state.verifier.verify(&token).map_err(reject)
}

fn reject(e: AuthError) -> StatusCode {
    tracing::debug!("Authentication failed: {}", e);
    StatusCode::UNAUTHORIZED
}

/// Identity of an HTTP caller, taken from the bearer header.
pub struct AuthUser(pub UserId);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        authenticate(state, bearer_token(&parts.headers))
            .map(AuthUser)
            .map_err(|status| {
                (
                    status,
                    Json(ErrorResponse {
                        error: "Authentication required".to_string(),
                    }),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        // テスト項目: Bearer ヘッダーからトークンを取り出す
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi".to_string()));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
