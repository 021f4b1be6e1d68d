//! Route handlers.

use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, State},
    Form, Json,
};

use crate::auth::{AuthError, AuthUser};
use crate::cipher::{rot13, validate, ValidationError};
use crate::http::error::{ApiError, ApiResult};
use crate::http::response::{
    ApiInfo, EncodeResponse, HealthResponse, LoginForm, TextRequest, TokenResponse,
    UserInfoResponse,
};
use crate::http::server::AppState;
use crate::observability::metrics;

const MASKED_PASSWORD: &str = "xxxxxxx";

/// Basic API information.
pub async fn api_info(State(state): State<AppState>) -> Json<ApiInfo> {
    let live = state.live();
    let users = live
        .users
        .usernames()
        .into_iter()
        .map(|name| (name.to_string(), MASKED_PASSWORD.to_string()))
        .collect();

    Json(ApiInfo {
        service: "ROT13 API".to_string(),
        auth: "JWT Token required".to_string(),
        login: "POST /login with username/password".to_string(),
        users,
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Exchange username and password for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Form(credentials) = form.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let live = state.live();

    let Some(user) = live
        .users
        .authenticate(&credentials.username, &credentials.password)
    else {
        tracing::info!(username = %credentials.username, "Login failed");
        metrics::record_login("failure");
        return Err(AuthError::InvalidCredentials.into());
    };

    let (access_token, expires_at) = live.tokens.create_access_token(&user.username)?;
    tracing::info!(username = %user.username, expires_at, "Login succeeded");
    metrics::record_login("success");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Encode the request text with ROT13.
pub async fn encode(
    AuthUser(user): AuthUser,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> ApiResult<Json<EncodeResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let text = validate(&request.text).inspect_err(|e| {
        let outcome = match e {
            ValidationError::EmptyInput => "empty_input",
            ValidationError::InvalidCharacter { .. } => "invalid_character",
        };
        metrics::record_transform(outcome);
    })?;

    let encoded = rot13(&text);
    metrics::record_transform("ok");
    tracing::debug!(user = %user.username, len = encoded.len(), "Text encoded");

    Ok(Json(EncodeResponse {
        result: encoded.into_inner(),
        user: user.username,
    }))
}

/// Details of the authenticated caller.
pub async fn user_info(AuthUser(user): AuthUser) -> Json<UserInfoResponse> {
    Json(UserInfoResponse {
        message: format!("Hello {}!", user.username),
        user_id: user.id,
        username: user.username,
    })
}
