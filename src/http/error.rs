//! API error type and its mapping to HTTP responses.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AuthError;
use crate::cipher::ValidationError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Everything a handler or middleware can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Body could not be decoded.
    #[error("{0}")]
    BadRequest(String),

    #[error("Too many requests. Please try again later.")]
    RateLimited { retry_after: Duration },

    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct DetailBody {
    detail: String,
}

#[derive(Serialize)]
struct RateLimitBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::TokenCreation(_)) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            ApiError::RateLimited { retry_after } => {
                let body = RateLimitBody {
                    error: self.to_string(),
                };
                let secs = retry_after.as_secs_f64().ceil().max(1.0) as u64;
                (
                    status,
                    [(header::RETRY_AFTER, secs.to_string())],
                    Json(body),
                )
                    .into_response()
            }
            ApiError::Auth(AuthError::TokenCreation(ref msg)) | ApiError::Internal(ref msg) => {
                // Log the real error server-side, return generic message to client
                tracing::error!(error = %msg, "Internal error");
                let body = DetailBody {
                    detail: "Internal server error".to_string(),
                };
                (status, Json(body)).into_response()
            }
            ApiError::Auth(ref err) => {
                let body = DetailBody {
                    detail: err.to_string(),
                };
                let mut response = (status, Json(body)).into_response();
                if *err != AuthError::InvalidCredentials {
                    response.headers_mut().insert(
                        header::WWW_AUTHENTICATE,
                        HeaderValue::from_static("Bearer"),
                    );
                }
                response
            }
            ApiError::Validation(_) | ApiError::BadRequest(_) => {
                let body = DetailBody {
                    detail: self.to_string(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_token_response() {
        let response = ApiError::from(AuthError::InvalidToken).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "detail": "Invalid token" })
        );
    }

    #[tokio::test]
    async fn test_bad_login_has_no_challenge_header() {
        let response = ApiError::from(AuthError::InvalidCredentials).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
        assert_eq!(
            body_json(response).await["detail"],
            "Invalid username or password"
        );
    }

    #[tokio::test]
    async fn test_validation_response() {
        let response = ApiError::from(ValidationError::EmptyInput).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["detail"], "Can't be empty");
    }

    #[tokio::test]
    async fn test_rate_limited_response() {
        let response = ApiError::RateLimited {
            retry_after: Duration::from_millis(11_200),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "12");
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Too many requests. Please try again later." })
        );
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let response = ApiError::Internal("db exploded".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["detail"], "Internal server error");
    }
}
