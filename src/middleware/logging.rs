//! Request logging middleware.
//!
//! One line per request: method, path, status and latency. Auth rejections
//! (401/403) log at INFO with the status so failed gate checks are visible
//! without turning on debug output.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn, Instrument};

pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    // Health probes are noise
    if path == "/health" {
        return next.run(request).await;
    }

    let span = tracing::info_span!("http_request", method = %method, path = %path);
    let start = Instant::now();
    let response = next.run(request).instrument(span).await;

    let latency_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    match status {
        500.. => warn!(
            method = %method,
            path = %path,
            status,
            latency_ms,
            "Request failed (5xx)"
        ),
        401 | 403 => info!(
            method = %method,
            path = %path,
            status,
            latency_ms,
            "Request rejected at gate"
        ),
        _ => info!(
            method = %method,
            path = %path,
            status,
            latency_ms,
            "Request completed"
        ),
    }

    response
}
