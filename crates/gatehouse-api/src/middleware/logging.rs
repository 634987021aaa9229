//! Request logging middleware.

use std::time::Instant;

use axum::extract::Request;
use axum::http::header::LOCATION;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn};

/// Records method, path, status and latency of every request.
///
/// Redirects also record their target, so login, logout and denial
/// outcomes are visible in the access log.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if response.status().is_server_error() {
        warn!(method = %method, path = %path, status, latency_ms, "HTTP request failed");
    } else if response.status().is_redirection() {
        info!(method = %method, path = %path, status, latency_ms, location, "HTTP request redirected");
    } else {
        info!(method = %method, path = %path, status, latency_ms, "HTTP request");
    }

    response
}
