//! Bearer token verification.
//!
//! Every request except CORS preflights and the health probe passes through
//! [`require_application`] before routing. Verification either rejects the
//! request with an `auth_error` envelope or hands the resolved application
//! to the handler as a [`Verified`] value.

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::store::{Application, StoreError, TokenStore};
use crate::web::envelope::{Envelope, ErrorCode};
use crate::web::handlers::AppState;

/// Scheme prefix the `Authorization` header must start with.
pub const BEARER_PREFIX: &str = "Bearer";

/// Client-facing authentication failures.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Must specify Bearer token.")]
    MissingBearer,

    #[error("Invalid Bearer token.")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        Envelope::<()>::error(StatusCode::FORBIDDEN, ErrorCode::AuthError, self.to_string())
            .into_response()
    }
}

/// Verification failure: either the caller's fault or the token store's.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("token lookup failed: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for VerifyError {
    fn into_response(self) -> Response {
        match self {
            VerifyError::Auth(e) => e.into_response(),
            VerifyError::Store(e) => {
                error!(error = %e, "auth_token_lookup_failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// An application whose bearer token has been checked against the token
/// store.
///
/// Only [`verify`] constructs this, so a handler taking `Verified` cannot run
/// on an unauthenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified(Application);

impl Verified {
    pub fn application(&self) -> &Application {
        &self.0
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The check is a fixed, case-sensitive prefix match on `Bearer`; whatever
/// follows it is trimmed and returned as the token (possibly empty).
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .ok_or(AuthError::MissingBearer)
}

/// Resolve the request's bearer token to an application.
pub async fn verify(headers: &HeaderMap, tokens: &dyn TokenStore) -> Result<Verified, VerifyError> {
    let token = match bearer_token(headers) {
        Ok(token) => token,
        Err(e) => {
            warn!(
                has_authorization = headers.contains_key(AUTHORIZATION),
                "auth_missing_bearer"
            );
            return Err(e.into());
        }
    };

    match tokens.get(token).await? {
        Some(application) => {
            info!(
                application = %application.name,
                prefix = %application.prefix,
                "auth_verified"
            );
            Ok(Verified(application))
        }
        None => {
            warn!(token_length = token.len(), "auth_invalid_token");
            Err(AuthError::InvalidToken.into())
        }
    }
}

/// Middleware that verifies every request before it is routed.
///
/// On success the [`Verified`] application travels with the request to the
/// handler; on failure the handler is never called.
pub async fn require_application(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match verify(request.headers(), state.tokens.as_ref()).await {
        Ok(verified) => {
            request.extensions_mut().insert(verified);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Verified
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Verified>().cloned().ok_or_else(|| {
            // Route mounted outside `require_application`.
            error!(path = %parts.uri.path(), "auth_verified_application_missing");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTokenStore;
    use axum::http::HeaderValue;

    fn headers(auth: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(auth) = auth {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        }
        headers
    }

    fn store() -> MemoryTokenStore {
        let mut store = MemoryTokenStore::new();
        store.insert(
            "secret",
            Application {
                name: "Foo".to_string(),
                prefix: "foo".to_string(),
            },
        );
        store
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers(Some("Bearer secret"))), Ok("secret"));
        assert_eq!(bearer_token(&headers(Some("Bearer   secret  "))), Ok("secret"));
        assert_eq!(bearer_token(&headers(Some("Bearersecret"))), Ok("secret"));
        assert_eq!(bearer_token(&headers(Some("Bearer"))), Ok(""));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token(&headers(None)), Err(AuthError::MissingBearer));
        assert_eq!(
            bearer_token(&headers(Some("Basic dXNlcjpwYXNz"))),
            Err(AuthError::MissingBearer)
        );
        assert_eq!(
            bearer_token(&headers(Some("bearer secret"))),
            Err(AuthError::MissingBearer)
        );
        assert_eq!(
            bearer_token(&headers(Some(" Bearer secret"))),
            Err(AuthError::MissingBearer)
        );
    }

    #[tokio::test]
    async fn test_verify_known_token() {
        let verified = verify(&headers(Some("Bearer secret")), &store()).await.unwrap();
        assert_eq!(verified.application().name, "Foo");
        assert_eq!(verified.application().prefix, "foo");
    }

    #[tokio::test]
    async fn test_verify_unknown_token() {
        let err = verify(&headers(Some("Bearer nope")), &store()).await.unwrap_err();
        assert!(matches!(err, VerifyError::Auth(AuthError::InvalidToken)));

        let err = verify(&headers(Some("Bearer")), &store()).await.unwrap_err();
        assert!(matches!(err, VerifyError::Auth(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_verify_missing_header() {
        let err = verify(&headers(None), &store()).await.unwrap_err();
        assert!(matches!(err, VerifyError::Auth(AuthError::MissingBearer)));
    }

    #[test]
    fn test_auth_error_messages() {
        assert_eq!(AuthError::MissingBearer.to_string(), "Must specify Bearer token.");
        assert_eq!(AuthError::InvalidToken.to_string(), "Invalid Bearer token.");
    }
}
