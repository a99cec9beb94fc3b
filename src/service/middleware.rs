//! Service middleware for metrics and request tracking.
//!
//! ## Metrics Exposed
//!
//! - `tier_board_requests_total` - Counter of total requests by path, method, status
//! - `tier_board_request_duration_seconds` - Histogram of request latency
//! - `tier_board_moves_total` - Counter of drop gestures by outcome
//! - `tier_board_saves_total` - Counter of saves by result

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::time::Instant;
use tracing::info;

/// Session ids in request paths.
static SESSION_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("Invalid session id regex")
});

/// Board scope segment of the open-session route.
static BOARD_SCOPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/api/boards/[^/]+").expect("Invalid board scope regex")
});

/// Metrics middleware that records request counts and latency.
///
/// Uses tracing for now - can be aggregated from logs.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = normalize_path(request.uri().path());

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();

    info!(
        target: "tier_board::metrics",
        metric_type = "request",
        path = %path,
        method = %method,
        status = status,
        latency_ms = latency.as_millis() as u64,
        "request_metric"
    );

    response
}

/// Normalize path for metrics to avoid high cardinality.
///
/// Session UUIDs become `:id` and board scopes become `:scope`.
fn normalize_path(path: &str) -> String {
    let path = SESSION_ID.replace_all(path, ":id");
    BOARD_SCOPE.replace(&path, "/api/boards/:scope").to_string()
}

/// Record the outcome of a drop gesture.
pub fn record_move(outcome: &str) {
    info!(
        target: "tier_board::metrics",
        metric_type = "move",
        outcome = outcome,
        "move_metric"
    );
}

/// Record a board save.
pub fn record_save(rows: usize, success: bool, latency_ms: u64) {
    let status = if success { "success" } else { "error" };
    info!(
        target: "tier_board::metrics",
        metric_type = "save",
        rows = rows,
        status = status,
        latency_ms = latency_ms,
        "save_metric"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_replaces_uuid() {
        let path = "/api/sessions/550e8400-e29b-41d4-a716-446655440000/moves";
        assert_eq!(normalize_path(path), "/api/sessions/:id/moves");
    }

    #[test]
    fn test_normalize_path_replaces_scope() {
        assert_eq!(normalize_path("/api/boards/2024/sessions"), "/api/boards/:scope/sessions");
        assert_eq!(normalize_path("/api/boards/all-time/sessions"), "/api/boards/:scope/sessions");
    }

    #[test]
    fn test_path_patterns_compile_once() {
        let id = "550e8400-e29b-41d4-a716-446655440000";
        assert!(SESSION_ID.is_match(id));
        assert!(!SESSION_ID.is_match("550e8400"));
        assert!(BOARD_SCOPE.is_match("/api/boards/2024"));
        assert!(!BOARD_SCOPE.is_match("/api/sessions/2024"));

        for _ in 0..3 {
            assert_eq!(normalize_path(&format!("/api/sessions/{}", id)), "/api/sessions/:id");
        }
    }

    #[test]
    fn test_normalize_path_preserves_regular_path() {
        assert_eq!(normalize_path("/health/ready"), "/health/ready");
    }
}
