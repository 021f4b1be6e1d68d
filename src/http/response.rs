//! Request and response bodies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `GET /`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiInfo {
    pub service: String,
    pub auth: String,
    pub login: String,
    /// Username to masked password.
    pub users: BTreeMap<String, String>,
}

/// `GET /health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// `POST /login` form fields. Extra OAuth2 password-grant fields are ignored.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// `POST /api/rot13` body.
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EncodeResponse {
    pub result: String,
    pub user: String,
}

/// `GET /api/user-info`
#[derive(Debug, Serialize, Deserialize)]
pub struct UserInfoResponse {
    pub message: String,
    pub user_id: u64,
    pub username: String,
}
