//! Bearer token extractor for protected handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::{AuthError, User};
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// The caller identified by a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::MissingCredentials)?;

        let live = state.live();
        let username = live.tokens.verify_token(token)?;

        let user = live
            .users
            .get(&username)
            .cloned()
            .ok_or(AuthError::UserNotFound)?;

        Ok(AuthUser(user))
    }
}

/// The token from `Authorization: Bearer <token>`, scheme matched case-insensitively.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
