//! `AuthUser` extractor: pulls the JWT from the request, validates it, and
//! injects the principal's context.

use axum::extract::{FromRequestParts, Query};
use axum::http::Uri;
use axum::http::request::Parts;
use serde::Deserialize;

use docvault_core::error::AppError;
use docvault_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated principal context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Like [`AuthUser`] but absent credentials are not an error. Also accepts
/// the token as a `token` query parameter, for plain download links.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<RequestContext>);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        Ok(AuthUser(authenticate(state, token).await?))
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let from_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string);

        let token = from_header.or_else(|| query_token(&parts.uri));
        match token {
            // A presented but invalid token is rejected rather than ignored.
            Some(token) => Ok(MaybeAuthUser(Some(authenticate(state, &token).await?))),
            None => Ok(MaybeAuthUser(None)),
        }
    }
}

/// Decode a token and load its principal, rejecting inactive accounts.
async fn authenticate(state: &AppState, token: &str) -> Result<RequestContext, AppError> {
    let claims = state.jwt_decoder.decode(token)?;

    let principal = state
        .principal_repo
        .find_by_id(claims.principal_id())
        .await?
        .ok_or_else(|| AppError::authentication("Unknown principal"))?;

    if !principal.is_active {
        return Err(AppError::authentication("Account is disabled"));
    }

    Ok(RequestContext::new(&principal))
}

/// The `token` parameter of a download link.
#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn query_token(uri: &Uri) -> Option<String> {
    Query::<TokenQuery>::try_from_uri(uri)
        .ok()?
        .0
        .token
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_of(uri: &str) -> Option<String> {
        query_token(&uri.parse::<Uri>().expect("uri"))
    }

    #[test]
    fn test_query_token_is_found_among_other_params() {
        assert_eq!(token_of("/api/files/a?revision=2&token=abc"), Some("abc".to_string()));
        assert_eq!(token_of("/api/files/a?token="), None);
        assert_eq!(token_of("/api/files/a?revision=2"), None);
        assert_eq!(token_of("/api/files/a"), None);
    }

    #[test]
    fn test_query_token_is_percent_decoded() {
        assert_eq!(token_of("/api/files/a?token=ab%2Ecd%3D"), Some("ab.cd=".to_string()));
        assert_eq!(token_of("/api/files/a?token=a+b"), Some("a b".to_string()));
    }
}
