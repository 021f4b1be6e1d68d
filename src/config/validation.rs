//! Configuration validation.
//!
//! Semantic checks that serde cannot express. All problems are collected so
//! a broken config file can be fixed in one pass.

use std::collections::HashSet;
use std::net::SocketAddr;

use jsonwebtoken::Algorithm;

use crate::config::schema::AppConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigViolation {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("listener.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("auth.secret_key must not be empty")]
    EmptySecret,

    #[error("auth.algorithm `{0}` is not one of HS256, HS384, HS512")]
    UnsupportedAlgorithm(String),

    #[error("auth.access_token_expire_minutes must be greater than zero")]
    ZeroTokenLifetime,

    #[error("auth.users contains an empty username")]
    EmptyUsername,

    #[error("auth.users contains `{0}` more than once")]
    DuplicateUsername(String),

    #[error("auth.users contains id {0} more than once")]
    DuplicateUserId(u64),

    #[error("rate_limit.{0} must be greater than zero")]
    ZeroQuota(&'static str),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),

    #[error("environment variable {key}=`{value}` is not a valid number")]
    EnvOverride { key: &'static str, value: String },
}

/// Parse the configured algorithm name, accepting only HMAC variants.
pub fn parse_algorithm(name: &str) -> Option<Algorithm> {
    match name.parse::<Algorithm>() {
        Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Some(alg),
        _ => None,
    }
}

/// Validate a parsed configuration, returning every violation found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ConfigViolation>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ConfigViolation::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ConfigViolation::ZeroBodyLimit);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ConfigViolation::ZeroRequestTimeout);
    }

    let auth = &config.auth;
    if auth.secret_key.is_empty() {
        errors.push(ConfigViolation::EmptySecret);
    }
    if parse_algorithm(&auth.algorithm).is_none() {
        errors.push(ConfigViolation::UnsupportedAlgorithm(auth.algorithm.clone()));
    }
    if auth.access_token_expire_minutes == 0 {
        errors.push(ConfigViolation::ZeroTokenLifetime);
    }

    let mut names = HashSet::new();
    let mut ids = HashSet::new();
    for user in &auth.users {
        if user.username.is_empty() {
            errors.push(ConfigViolation::EmptyUsername);
        } else if !names.insert(user.username.as_str()) {
            errors.push(ConfigViolation::DuplicateUsername(user.username.clone()));
        }
        if !ids.insert(user.id) {
            errors.push(ConfigViolation::DuplicateUserId(user.id));
        }
    }

    let limits = &config.rate_limit;
    if limits.enabled {
        let quotas = [
            ("info_per_minute", limits.info_per_minute),
            ("health_per_minute", limits.health_per_minute),
            ("login_per_minute", limits.login_per_minute),
            ("rot13_per_minute", limits.rot13_per_minute),
            ("user_info_per_minute", limits.user_info_per_minute),
        ];
        for (name, quota) in quotas {
            if quota == 0 {
                errors.push(ConfigViolation::ZeroQuota(name));
            }
        }
    }

    let obs = &config.observability;
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ConfigViolation::MetricsAddress(obs.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::UserConfig;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_all_violations_reported() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.auth.secret_key.clear();
        config.auth.algorithm = "RS256".into();
        config.rate_limit.login_per_minute = 0;
        config.auth.users.push(UserConfig {
            id: 3,
            username: "admin".into(),
            password: "again".into(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ConfigViolation::BindAddress("not-an-address".into()),
                ConfigViolation::EmptySecret,
                ConfigViolation::UnsupportedAlgorithm("RS256".into()),
                ConfigViolation::DuplicateUsername("admin".into()),
                ConfigViolation::ZeroQuota("login_per_minute"),
            ]
        );
    }

    #[test]
    fn test_zero_quota_allowed_when_disabled() {
        let mut config = AppConfig::default();
        config.rate_limit.enabled = false;
        config.rate_limit.health_per_minute = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut config = AppConfig::default();
        config.auth.users[1].id = 1;
        assert_eq!(
            validate_config(&config),
            Err(vec![ConfigViolation::DuplicateUserId(1)])
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ConfigViolation::MetricsAddress("nope".into())])
        );
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!(parse_algorithm("HS256"), Some(Algorithm::HS256));
        assert_eq!(parse_algorithm("HS512"), Some(Algorithm::HS512));
        assert_eq!(parse_algorithm("ES256"), None);
        assert_eq!(parse_algorithm("hs256"), None);
    }
}
