//! ROT13 API library.
//!
//! A small HTTP service that encodes text with ROT13 behind JWT bearer
//! authentication and per-IP rate limiting.

// Core
pub mod cipher;

// Service subsystems
pub mod auth;
pub mod config;
pub mod http;
pub mod security;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use cipher::{rot13, validate, ValidText, ValidationError};
pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
