//! API key authentication middleware for Axum.
//!
//! Every protected route requires an `x-api-key` header matching the
//! configured key. A missing header is 401, a wrong key is 403.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::gateway::state::AppState;
use crate::transfers::ErrorBody;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing x-api-key header")]
    MissingKey,
    #[error("invalid API key")]
    InvalidKey,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingKey => "MISSING_API_KEY",
            AuthError::InvalidKey => "INVALID_API_KEY",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            AuthError::MissingKey => StatusCode::UNAUTHORIZED,
            AuthError::InvalidKey => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (self.http_status(), Json(body)).into_response()
    }
}

/// Check the `x-api-key` header against the expected key
pub fn check_api_key(headers: &HeaderMap, expected: &str) -> Result<(), AuthError> {
    let presented = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingKey)?;

    if presented != expected {
        return Err(AuthError::InvalidKey);
    }
    Ok(())
}

/// Axum middleware gating protected routes on the shared API key
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    check_api_key(request.headers(), &state.api_key)?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_key(key: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_str(key).unwrap());
        headers
    }

    #[test]
    fn test_missing_key_is_unauthorized() {
        let err = check_api_key(&HeaderMap::new(), "secret").unwrap_err();
        assert_eq!(err, AuthError::MissingKey);
        assert_eq!(err.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.code(), "MISSING_API_KEY");
    }

    #[test]
    fn test_wrong_key_is_forbidden() {
        let err = check_api_key(&headers_with_key("nope"), "secret").unwrap_err();
        assert_eq!(err, AuthError::InvalidKey);
        assert_eq!(err.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(err.code(), "INVALID_API_KEY");
    }

    #[test]
    fn test_matching_key_passes() {
        assert!(check_api_key(&headers_with_key("secret"), "secret").is_ok());
    }
}
