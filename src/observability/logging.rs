//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Log one line per request with method, path, status and timing
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over the configured level

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::http::request::X_REQUEST_ID;
use crate::observability::metrics;

/// Install the global tracing subscriber.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("agro_geo_api={level},tower_http={level}").into());

    // A second call (tests) leaves the first subscriber in place.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Request logging middleware.
pub async fn request_logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let request_id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_owned();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed = start.elapsed();
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = status.as_u16(),
        elapsed_ms = format_args!("{:.4}", elapsed.as_secs_f64() * 1000.0),
        "Request handled"
    );
    metrics::record_request(method.as_str(), status.as_u16(), elapsed);

    response
}
