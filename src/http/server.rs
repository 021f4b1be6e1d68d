//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, CORS)
//! - Apply per-route rate limits and request metrics
//! - Swap in reloaded configuration
//! - Serve until the shutdown signal fires

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request},
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    map_response_body::MapResponseBodyLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::Span;

use crate::auth::{TokenIssuer, UserStore};
use crate::config::{AppConfig, CorsConfig};
use crate::http::handlers;
use crate::http::request::{RequestUuid, X_REQUEST_ID};
use crate::observability::metrics;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiter};

/// How often idle rate-limit buckets are purged.
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Everything derived from one configuration snapshot.
pub struct LiveState {
    pub config: AppConfig,
    pub users: UserStore,
    pub tokens: TokenIssuer,
}

impl LiveState {
    pub fn from_config(config: AppConfig) -> Self {
        Self {
            users: UserStore::from_config(&config.auth.users),
            tokens: TokenIssuer::from_config(&config.auth),
            config,
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<LiveState>>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(LiveState::from_config(config))),
            limiter: Arc::new(RateLimiter::new()),
        }
    }

    /// Current configuration snapshot.
    pub fn live(&self) -> Arc<LiveState> {
        self.inner.load_full()
    }

    /// Replace the live snapshot. Rate limit buckets are kept.
    pub fn reload(&self, config: AppConfig) {
        self.inner.store(Arc::new(LiveState::from_config(config)));
    }
}

/// HTTP server for the ROT13 API.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        let state = AppState::new(config.clone());
        let router = Self::build_router(&config, state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::api_info))
            .route("/health", get(handlers::health))
            .route("/login", post(handlers::login))
            .route("/api/rot13", post(handlers::encode))
            .route("/api/user-info", get(handlers::user_info))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_middleware,
            ))
            .route_layer(middleware::from_fn(metrics::track_metrics))
            .with_state(state)
            .layer(
                // Outermost first.
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, RequestUuid))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                    .layer(TraceLayer::new_for_http().make_span_with(request_span))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    )))
                    .layer(MapResponseBodyLayer::new(Body::new))
                    .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
                    .layer(cors_layer(&config.cors)),
            )
    }

    /// Shared state, e.g. to swap configuration from outside.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<AppConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let reload_state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                tracing::info!(
                    users = config.auth.users.len(),
                    rate_limit_enabled = config.rate_limit.enabled,
                    "Applying reloaded configuration"
                );
                reload_state.reload(config);
            }
        });

        let limiter = self.state.limiter.clone();
        let mut purge_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PURGE_INTERVAL);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let removed = limiter.purge_idle(PURGE_INTERVAL);
                        if removed > 0 {
                            tracing::debug!(removed, "Purged idle rate limit buckets");
                        }
                    }
                    _ = purge_shutdown.recv() => break,
                }
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Empty origin list means same-origin only; `"*"` allows any origin.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if config.allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        layer
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
