//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rot13_http_requests_total` (counter): requests by method, route, status
//! - `rot13_http_request_duration_seconds` (histogram): latency by method, route
//! - `rot13_rate_limited_total` (counter): rejected requests by route
//! - `rot13_transform_total` (counter): encode attempts by outcome
//! - `rot13_login_total` (counter): logins by outcome
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "rot13_http_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "rot13_http_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited(route: &'static str) {
    metrics::counter!("rot13_rate_limited_total", "route" => route).increment(1);
}

pub fn record_transform(outcome: &'static str) {
    metrics::counter!("rot13_transform_total", "outcome" => outcome).increment(1);
}

pub fn record_login(outcome: &'static str) {
    metrics::counter!("rot13_login_total", "outcome" => outcome).increment(1);
}

/// Route-level middleware recording count and latency per matched route.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let response = next.run(request).await;

    record_request(method.as_str(), &route, response.status().as_u16(), start);
    response
}
