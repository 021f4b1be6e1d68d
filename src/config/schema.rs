//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::config::validation::ConfigViolation;

/// Placeholder signing secret shipped in the defaults.
pub const PLACEHOLDER_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Root configuration for the ROT13 API.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Token signing and the user table.
    pub auth: AuthConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Cross-origin settings.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// A user allowed to log in.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct UserConfig {
    pub id: u64,
    pub username: String,
    pub password: String,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to sign access tokens.
    pub secret_key: String,

    /// JWT algorithm name (HS256, HS384 or HS512).
    pub algorithm: String,

    /// Lifetime of an issued access token.
    pub access_token_expire_minutes: u64,

    /// Static user table.
    pub users: Vec<UserConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Change this in production.
            secret_key: PLACEHOLDER_SECRET.to_string(),
            algorithm: "HS256".to_string(),
            access_token_expire_minutes: 30,
            users: vec![
                UserConfig {
                    id: 1,
                    username: "testuser".to_string(),
                    password: "testuser123".to_string(),
                },
                UserConfig {
                    id: 2,
                    username: "admin".to_string(),
                    password: "admin123".to_string(),
                },
            ],
        }
    }
}

/// Rate limiting configuration. Quotas are requests per minute per client IP.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// `GET /`
    pub info_per_minute: u32,

    /// `GET /health`
    pub health_per_minute: u32,

    /// `POST /login`
    pub login_per_minute: u32,

    /// `POST /api/rot13`
    pub rot13_per_minute: u32,

    /// `GET /api/user-info`
    pub user_info_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            info_per_minute: 10,
            health_per_minute: 30,
            login_per_minute: 5,
            rot13_per_minute: 20,
            user_info_per_minute: 15,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. Empty means same-origin only, `"*"` allows any.
    pub allowed_origins: Vec<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

impl AppConfig {
    /// Apply `ROT13_*` environment overrides on top of file values.
    ///
    /// Overrides that cannot be parsed are returned as violations and leave
    /// the file value in place.
    pub fn apply_env_overrides(&mut self) -> Vec<ConfigViolation> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub(crate) fn apply_overrides<F>(&mut self, lookup: F) -> Vec<ConfigViolation>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut errors = Vec::new();

        if let Some(v) = lookup("ROT13_BIND_ADDRESS") {
            self.listener.bind_address = v;
        }
        if let Some(v) = lookup("ROT13_SECRET_KEY") {
            self.auth.secret_key = v;
        }
        if let Some(v) = lookup("ROT13_ALGORITHM") {
            self.auth.algorithm = v;
        }
        const TTL_KEY: &str = "ROT13_ACCESS_TOKEN_EXPIRE_MINUTES";
        if let Some(v) = lookup(TTL_KEY) {
            match v.trim().parse() {
                Ok(minutes) => self.auth.access_token_expire_minutes = minutes,
                Err(_) => errors.push(ConfigViolation::EnvOverride {
                    key: TTL_KEY,
                    value: v,
                }),
            }
        }
        if let Some(v) = lookup("ROT13_LOG_LEVEL") {
            self.observability.log_level = v;
        }

        errors
    }

    /// True while the shipped placeholder secret is still in use.
    pub fn uses_placeholder_secret(&self) -> bool {
        self.auth.secret_key == PLACEHOLDER_SECRET
    }
}
