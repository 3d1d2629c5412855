//! Per-request service log and request metrics.

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;

use crate::http::auth::X_FORWARDED_FOR;
use crate::http::request::RequestIdExt;
use crate::observability::metrics;

/// Log one structured record per request once the response is ready.
///
/// The authorization header is never logged.
pub async fn service_log(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let request_id = request
        .request_id()
        .map(|id| id.to_string())
        .unwrap_or_default();
    let forwarded_for = request
        .headers()
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let response = next.run(request).await;
    let status = response.status();

    metrics::record_request(&route, status.as_u16(), start);
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        ip = %forwarded_for,
        status = status.as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Request handled"
    );
    response
}
