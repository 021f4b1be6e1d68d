use std::collections::BTreeMap;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx answer; `body` is the raw response text.
    #[error("API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("not logged in")]
    NoToken,
}

impl ClientError {
    /// HTTP status for `Status` errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiInfo {
    pub service: String,
    pub auth: String,
    pub login: String,
    pub users: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeResponse {
    pub result: String,
    pub user: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub message: String,
    pub user_id: u64,
    pub username: String,
}

#[derive(Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Replace the underlying HTTP client, e.g. to change proxy or timeout settings.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Use an existing token instead of logging in.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub async fn info(&self) -> Result<ApiInfo, ClientError> {
        self.send(self.client.get(self.url("/"))).await
    }

    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        self.send(self.client.get(self.url("/health"))).await
    }

    /// Log in and remember the returned token for later calls.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<TokenResponse, ClientError> {
        let req = self
            .client
            .post(self.url("/login"))
            .form(&[("username", username), ("password", password)]);
        let token: TokenResponse = self.send(req).await?;
        self.token = Some(token.access_token.clone());
        Ok(token)
    }

    pub async fn encode(&self, text: &str) -> Result<EncodeResponse, ClientError> {
        let req = self
            .client
            .post(self.url("/api/rot13"))
            .json(&TextRequest { text });
        self.send(self.authorized(req)?).await
    }

    pub async fn user_info(&self) -> Result<UserInfo, ClientError> {
        let req = self.client.get(self.url("/api/user-info"));
        self.send(self.authorized(req)?).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NoToken)?;
        Ok(req.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp: Response = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        Ok(resp.json().await?)
    }
}
