//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (request ID, access log, security headers, rate
//!   limiting, CORS, timeout, body limit)
//! - Bind server to listener with connect info for client identity
//! - Run the rate limit sweeper alongside the server
//! - Graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::api;
use crate::config::AppConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::Shutdown;
use crate::observability::logging::request_logging_middleware;
use crate::security::cors::cors_layer;
use crate::security::headers::security_headers_middleware;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiterState};

/// HTTP server for the API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    limiter: Arc<RateLimiterState>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        let limiter = Arc::new(RateLimiterState::from_config(&config.rate_limit));
        Self::with_limiter(config, limiter)
    }

    /// Create a server around an existing limiter (e.g. one driven by a
    /// manual clock).
    pub fn with_limiter(config: AppConfig, limiter: Arc<RateLimiterState>) -> Self {
        let router = Self::build_router(&config, limiter.clone());
        Self {
            router,
            config,
            limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers added later wrap the earlier ones, so the request passes them
    /// bottom-up: request ID, access log, trace span, security headers, rate
    /// limiter, CORS, timeout, body limit, handler.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, limiter: Arc<RateLimiterState>) -> Router {
        let mut router = api::router()
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(cors_layer(&config.security.allowed_origins));

        if config.rate_limit.enabled {
            router = router.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
        } else {
            tracing::warn!("Rate limiting disabled; responses carry no X-RateLimit headers");
        }

        if config.security.enable_headers {
            router = router.layer(middleware::from_fn(security_headers_middleware));
        }

        router.layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(middleware::from_fn(request_logging_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer()),
        )
    }

    /// Run the server, accepting connections on the given listener until
    /// the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sweeper = match self.config.rate_limit.sweep_interval_secs {
            0 => None,
            secs if self.config.rate_limit.enabled => Some(RateLimiterState::spawn_sweeper(
                self.limiter.clone(),
                Duration::from_secs(secs),
                shutdown.resubscribe(),
            )),
            _ => None,
        };

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(Shutdown::wait(shutdown))
            .await?;

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn limiter(&self) -> &Arc<RateLimiterState> {
        &self.limiter
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
