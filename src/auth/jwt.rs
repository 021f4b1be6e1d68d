//! Access token issuance and verification.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::config::validation::parse_algorithm;
use crate::config::AuthConfig;

/// Token payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub username: String,
    pub exp: u64,
}

/// Signs and verifies access tokens with one HMAC secret.
#[derive(Clone)]
pub struct TokenIssuer {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.algorithm)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &str, algorithm: Algorithm, ttl_minutes: u64) -> Self {
        Self {
            algorithm,
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: ttl_minutes.saturating_mul(60),
        }
    }

    /// Build from validated auth config. Unknown algorithm names fall back to HS256.
    pub fn from_config(config: &AuthConfig) -> Self {
        let algorithm = parse_algorithm(&config.algorithm).unwrap_or(Algorithm::HS256);
        Self::new(
            &config.secret_key,
            algorithm,
            config.access_token_expire_minutes,
        )
    }

    /// Issue a token for `username`, returning it with its expiry timestamp.
    pub fn create_access_token(&self, username: &str) -> Result<(String, u64), AuthError> {
        let now = unix_now()?;
        self.create_token_at(username, now + self.ttl_secs)
    }

    fn create_token_at(&self, username: &str, exp: u64) -> Result<(String, u64), AuthError> {
        let claims = Claims {
            username: username.to_string(),
            exp,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))?;
        Ok((token, exp))
    }

    /// Verify signature and expiry, returning the username the token was issued to.
    pub fn verify_token(&self, token: &str) -> Result<String, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            AuthError::InvalidToken
        })?;

        Ok(data.claims.username)
    }
}

fn unix_now() -> Result<u64, AuthError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret", Algorithm::HS256, 30)
    }

    #[test]
    fn test_round_trip() {
        let issuer = issuer();
        let (token, exp) = issuer.create_access_token("testuser").unwrap();
        assert!(exp > unix_now().unwrap());
        assert_eq!(issuer.verify_token(&token).unwrap(), "testuser");
    }

    #[test]
    fn test_expiry_uses_ttl() {
        let issuer = TokenIssuer::new("k", Algorithm::HS384, 2);
        let before = unix_now().unwrap();
        let (_, exp) = issuer.create_access_token("u").unwrap();
        assert!(exp >= before + 120 && exp <= before + 121);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let (token, _) = issuer().create_access_token("testuser").unwrap();
        let other = TokenIssuer::new("other-secret", Algorithm::HS256, 30);
        assert_eq!(other.verify_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_wrong_algorithm_rejected() {
        let (token, _) = issuer().create_access_token("testuser").unwrap();
        let other = TokenIssuer::new("test-secret", Algorithm::HS512, 30);
        assert_eq!(other.verify_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_expired_rejected() {
        let issuer = issuer();
        let past = unix_now().unwrap() - 10;
        let (token, _) = issuer.create_token_at("testuser", past).unwrap();
        assert_eq!(issuer.verify_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_garbage_rejected() {
        assert_eq!(issuer().verify_token("not.a.jwt"), Err(AuthError::InvalidToken));
        assert_eq!(issuer().verify_token(""), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_missing_username_claim_rejected() {
        #[derive(Serialize)]
        struct Anonymous {
            exp: u64,
        }
        let claims = Anonymous {
            exp: unix_now().unwrap() + 60,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(issuer().verify_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_empty_username_claim_is_left_to_user_lookup() {
        let issuer = issuer();
        let (token, _) = issuer.create_access_token("").unwrap();
        assert_eq!(issuer.verify_token(&token).unwrap(), "");
    }

    #[test]
    fn test_from_config() {
        let config = AuthConfig {
            algorithm: "HS512".into(),
            ..AuthConfig::default()
        };
        let issuer = TokenIssuer::from_config(&config);
        let (token, _) = issuer.create_access_token("admin").unwrap();
        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS512);
    }
}
