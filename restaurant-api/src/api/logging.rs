//! Request logging middleware

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};

/// Log method, path, status and latency of every request
///
/// Client and server errors are logged at WARN.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();

    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let latency_ms = start.elapsed().as_millis();
    if response.status().is_client_error() || response.status().is_server_error() {
        warn!(request_id = %request_id, method = %method, path = %path, status, latency_ms, "Request failed");
    } else {
        info!(request_id = %request_id, method = %method, path = %path, status, latency_ms, "Request completed");
    }

    response
}
