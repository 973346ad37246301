//! Metrics collection and exposition.
//!
//! # Metrics
//! - `games_api_requests_total` (counter): requests by method, route, status
//! - `games_api_request_duration_seconds` (histogram): time to response head
//! - `games_api_relay_sessions_total` (counter): relay sessions by transport, outcome
//! - `games_api_relay_bytes_total` (counter): body bytes streamed from origins
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{extract::MatchedPath, extract::Request, middleware::Next, response::Response};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Requires a running Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics recorder")
        }
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "games_api_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "games_api_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_relay_session(transport: &'static str, outcome: &'static str) {
    counter!(
        "games_api_relay_sessions_total",
        "transport" => transport,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_relay_bytes(transport: &'static str, bytes: usize) {
    counter!("games_api_relay_bytes_total", "transport" => transport).increment(bytes as u64);
}

/// Middleware recording request counts and latency per matched route.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;
    record_request(&method, &route, response.status().as_u16(), start);
    response
}
