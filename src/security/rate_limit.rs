//! Per-client rate limiting with per-route quotas.

use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, MatchedPath, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Route families that get their own quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    Info,
    Health,
    Login,
    Rot13,
    UserInfo,
}

impl RouteClass {
    /// Map a matched route path to its class.
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" => Some(Self::Info),
            "/health" => Some(Self::Health),
            "/login" => Some(Self::Login),
            "/api/rot13" => Some(Self::Rot13),
            "/api/user-info" => Some(Self::UserInfo),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Health => "health",
            Self::Login => "login",
            Self::Rot13 => "rot13",
            Self::UserInfo => "user_info",
        }
    }

    /// Requests per minute allowed for this class.
    pub fn quota(self, config: &RateLimitConfig) -> u32 {
        match self {
            Self::Info => config.info_per_minute,
            Self::Health => config.health_per_minute,
            Self::Login => config.login_per_minute,
            Self::Rot13 => config.rot13_per_minute,
            Self::UserInfo => config.user_info_per_minute,
        }
    }
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

/// A token bucket. Capacity is the per-minute quota, refilled evenly over a minute.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_update: now,
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64, now: Instant) -> RateLimitDecision {
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();

        // Refill tokens
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            RateLimitDecision::Allowed {
                remaining: self.tokens.floor() as u32,
            }
        } else {
            let needed = 1.0 - self.tokens;
            RateLimitDecision::Limited {
                retry_after: Duration::from_secs_f64(needed / refill_rate),
            }
        }
    }
}

/// Buckets keyed by route class and client IP.
#[derive(Debug, Default)]
pub struct RateLimiter {
    buckets: DashMap<(RouteClass, IpAddr), TokenBucket>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take one request from the `(class, ip)` bucket under a quota of `per_minute`.
    pub fn check(&self, class: RouteClass, ip: IpAddr, per_minute: u32) -> RateLimitDecision {
        self.check_at(class, ip, per_minute, Instant::now())
    }

    fn check_at(
        &self,
        class: RouteClass,
        ip: IpAddr,
        per_minute: u32,
        now: Instant,
    ) -> RateLimitDecision {
        let capacity = f64::from(per_minute.max(1));
        let refill_rate = capacity / 60.0;

        let mut bucket = self
            .buckets
            .entry((class, ip))
            .or_insert_with(|| TokenBucket::new(capacity, now));
        bucket.try_acquire(capacity, refill_rate, now)
    }

    /// Drop buckets untouched for `max_idle`. Returns how many were removed.
    pub fn purge_idle(&self, max_idle: Duration) -> usize {
        self.purge_idle_at(max_idle, Instant::now())
    }

    fn purge_idle_at(&self, max_idle: Duration, now: Instant) -> usize {
        let before = self.buckets.len();
        self.buckets
            .retain(|_, b| now.saturating_duration_since(b.last_update) < max_idle);
        before - self.buckets.len()
    }

    /// Number of tracked buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Middleware applying the quota of the matched route to the client IP.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let class = request
        .extensions()
        .get::<MatchedPath>()
        .and_then(|p| RouteClass::from_path(p.as_str()));

    let Some(class) = class else {
        return next.run(request).await;
    };

    let live = state.live();
    if !live.config.rate_limit.enabled {
        return next.run(request).await;
    }

    let quota = class.quota(&live.config.rate_limit);
    match state.limiter.check(class, addr.ip(), quota) {
        RateLimitDecision::Allowed { .. } => next.run(request).await,
        RateLimitDecision::Limited { retry_after } => {
            tracing::warn!(
                client = %addr.ip(),
                route = class.as_str(),
                retry_after_secs = retry_after.as_secs_f64(),
                "Rate limit exceeded"
            );
            metrics::record_rate_limited(class.as_str());
            ApiError::RateLimited { retry_after }.into_response()
        }
    }
}
