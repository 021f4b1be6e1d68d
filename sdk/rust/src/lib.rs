//! Async client for the ROT13 API.

mod client;

pub use client::{ApiClient, ApiInfo, ClientError, EncodeResponse, TokenResponse, UserInfo};
