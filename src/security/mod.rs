//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (after route match):
//!     → rate_limit.rs (per-route quota for the client IP)
//!     → Pass to handler
//! ```
//!
//! # Design Decisions
//! - Client identity is the peer IP address of the connection
//! - Fail closed: a request over quota never reaches its handler

pub mod rate_limit;

pub use rate_limit::{RateLimitDecision, RateLimiter, RouteClass};
