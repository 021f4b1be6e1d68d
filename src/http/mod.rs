//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (request ID, trace span, timeout, body limit, CORS)
//!     → route match → metrics + rate limit (route layers)
//!     → handlers.rs (AuthUser extractor, body decoding, cipher)
//!     → response.rs bodies / error.rs on failure
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use request::{RequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer, LiveState};
