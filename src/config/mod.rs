//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, apply ROT13_* env overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via ArcSwap to handlers
//!
//! On file change (--watch):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the live snapshot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Bind address, CORS and logging are fixed at startup; a reload only
//!   affects auth and rate limit quotas

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    AppConfig, AuthConfig, CorsConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    RateLimitConfig, TimeoutConfig, UserConfig,
};
pub use validation::{validate_config, ConfigViolation};
pub use watcher::ConfigWatcher;
