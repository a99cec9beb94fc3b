//! Tier Board Service Binary
//!
//! Runs board editing sessions as a REST API service. Every request is
//! logged with a request id, taken from `X-Request-Id` when the caller sends
//! one and echoed back on the response.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DB_MAX_CONNECTIONS`, `DB_MIN_CONNECTIONS`, `DB_CONNECT_TIMEOUT_SECS`: pool tuning
//! - `SESSION_CAPACITY`: Open board sessions kept before eviction (default: 256)
//! - `PORT`: Service port (default: 8001)
//! - `HOST`: Service host (default: 0.0.0.0)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://... cargo run --bin tier_board_service --features service
//! ```

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::{self, Next},
    response::Response,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Instrument};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use tier_board::service::{create_router, metrics_middleware, ServiceState};
use tier_board::PostgresRatingStore;

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tier_board_service=info,tier_board=info,tower_http=info,sqlx=warn".into());

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .flatten_event(true)
            )
            .init();
    }
}

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id for log correlation: the caller's, or a fresh one.
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Listen address from `HOST` and `PORT`.
fn listen_addr(host: Option<String>, port: Option<String>) -> Result<SocketAddr, std::net::AddrParseError> {
    let host = host.unwrap_or_else(|| "0.0.0.0".to_string());
    let port: u16 = port.and_then(|s| s.parse().ok()).unwrap_or(8001);
    format!("{}:{}", host, port).parse()
}

/// Access log for every request, in a span carrying the request id.
async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = request_id(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        status = tracing::field::Empty,
    );

    let mut response = next.run(request).instrument(span.clone()).await;
    let status = response.status().as_u16();
    span.record("status", status);

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    info!(
        target: "tier_board_service::access",
        request_id = %request_id,
        method = %method,
        path = %path,
        status = status,
        latency_ms = start.elapsed().as_millis() as u64,
        "request completed"
    );

    response
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, draining open requests"),
        _ = terminate => info!("Received SIGTERM, draining open requests"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let version = env!("CARGO_PKG_VERSION");
    let build_sha = option_env!("BUILD_SHA").unwrap_or("dev");

    info!(
        version = version,
        build_sha = build_sha,
        "Starting Tier Board Service"
    );

    let addr = listen_addr(std::env::var("HOST").ok(), std::env::var("PORT").ok())?;

    // Connect to PostgreSQL with timeout
    info!("Connecting to PostgreSQL...");
    let connect_start = Instant::now();

    let store = match tokio::time::timeout(
        std::time::Duration::from_secs(30),
        PostgresRatingStore::from_env()
    ).await {
        Ok(Ok(store)) => store,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            return Err(e.into());
        }
        Err(_) => {
            tracing::error!("PostgreSQL connection timeout after 30s");
            return Err("Database connection timeout".into());
        }
    };

    store.ensure_schema().await?;

    let pool = store.pool_stats();
    info!(
        latency_ms = connect_start.elapsed().as_millis() as u64,
        pool_size = pool.size,
        pool_idle = pool.idle,
        pool_max = pool.max,
        "PostgreSQL connection established"
    );

    let state = ServiceState::from_env(store);
    info!(
        session_capacity = state.sessions.capacity(),
        "Session registry initialized"
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    info!(
        address = %addr,
        version = version,
        "Tier Board Service listening"
    );

    let listener = TcpListener::bind(addr).await?;

    info!("Ready to accept connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Tier Board Service shutdown complete");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_prefers_caller_header() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static(" club-42 "));
        assert_eq!(request_id(&headers), "club-42");
    }

    #[test]
    fn test_request_id_generated_when_missing_or_blank() {
        let generated = request_id(&HeaderMap::new());
        assert!(uuid::Uuid::parse_str(&generated).is_ok());

        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static(""));
        assert!(uuid::Uuid::parse_str(&request_id(&headers)).is_ok());
    }

    #[test]
    fn test_listen_addr_defaults_and_overrides() {
        assert_eq!(listen_addr(None, None).unwrap(), "0.0.0.0:8001".parse::<SocketAddr>().unwrap());
        assert_eq!(
            listen_addr(Some("127.0.0.1".to_string()), Some("9000".to_string())).unwrap(),
            "127.0.0.1:9000".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(listen_addr(None, Some("not-a-port".to_string())).unwrap().port(), 8001);
        assert!(listen_addr(Some("no host".to_string()), None).is_err());
    }
}
