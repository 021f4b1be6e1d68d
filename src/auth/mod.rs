//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! POST /login (form username/password)
//!     → users.rs (look up and compare password)
//!     → jwt.rs (sign { username, exp })
//!     → { access_token, token_type: "bearer" }
//!
//! Protected route:
//!     Authorization: Bearer <token>
//!     → extractor.rs (AuthUser, runs before the handler body)
//!     → jwt.rs (verify signature + expiry)
//!     → users.rs (token user must still exist)
//! ```

pub mod extractor;
pub mod jwt;
pub mod users;

pub use extractor::AuthUser;
pub use jwt::{Claims, TokenIssuer};
pub use users::{User, UserStore};

/// Authentication failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No usable `Authorization: Bearer` header.
    #[error("Not authenticated")]
    MissingCredentials,

    /// Bad signature, expired, or missing `username` claim.
    #[error("Invalid token")]
    InvalidToken,

    /// Token is valid but its user is no longer configured.
    #[error("User not found")]
    UserNotFound,

    /// Login with an unknown user or wrong password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("token creation failed: {0}")]
    TokenCreation(String),
}
