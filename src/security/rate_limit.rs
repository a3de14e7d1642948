//! Per-client sliding-window rate limiting.
//!
//! Every client (keyed by source IP) may make at most `requests_limit`
//! requests in any trailing `window_secs` interval. Each client keeps the
//! arrival times of its admitted requests; they are pruned on every check,
//! so a burst that straddles a bucket boundary is still throttled.
//!
//! # Concurrency
//! Windows live in a `DashMap`. The prune/count/append sequence for a client
//! runs while holding that entry's shard write lock, so two concurrent
//! requests from the same client can never both take the last slot.
//! The check performs no I/O and never awaits.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderName, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::RateLimitConfig;
use crate::observability::metrics;
use crate::security::clock::{Clock, SystemClock};

/// Client key used when the connection's source address is unknown.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Body of the 429 response.
pub const REJECTION_BODY: &str = "Rate limit exceeded. Please try again later.";

pub static X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub static X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub static X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Arrival times (epoch millis) of one client's admitted requests, in
/// arrival order.
#[derive(Debug, Default)]
struct ClientWindow {
    timestamps: VecDeque<u64>,
}

impl ClientWindow {
    /// Drop every timestamp that is `window_millis` or more older than `now`.
    ///
    /// The wall clock can step backwards, so entries are not assumed sorted.
    fn prune(&mut self, now: u64, window_millis: u64) {
        self.timestamps.retain(|&t| now.saturating_sub(t) < window_millis);
    }

    fn len(&self) -> usize {
        self.timestamps.len()
    }

    fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed to its handler.
    pub admitted: bool,
    /// Configured quota per window.
    pub limit: u32,
    /// Quota left after this check, clamped at 0.
    pub remaining: u32,
    /// Upper bound on when capacity frees up, seconds since epoch.
    pub reset_at: u64,
}

impl RateLimitDecision {
    /// Write the `X-RateLimit-*` headers.
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        headers.insert(X_RATELIMIT_LIMIT.clone(), HeaderValue::from(self.limit));
        headers.insert(X_RATELIMIT_REMAINING.clone(), HeaderValue::from(self.remaining));
        headers.insert(X_RATELIMIT_RESET.clone(), HeaderValue::from(self.reset_at));
    }
}

/// Process-wide state of the sliding-window rate limiter.
#[derive(Debug)]
pub struct RateLimiterState {
    windows: DashMap<String, ClientWindow>,
    requests_limit: u32,
    window_millis: u64,
    clock: Arc<dyn Clock>,
}

impl RateLimiterState {
    /// Create a limiter reading time from the system clock.
    pub fn new(requests_limit: u32, window: Duration) -> Self {
        Self::with_clock(requests_limit, window, Arc::new(SystemClock))
    }

    pub fn with_clock(requests_limit: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            requests_limit,
            window_millis: u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
            clock,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests_limit, Duration::from_secs(config.window_secs))
    }

    pub fn requests_limit(&self) -> u32 {
        self.requests_limit
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_millis)
    }

    /// Number of clients currently holding a window.
    pub fn client_count(&self) -> usize {
        self.windows.len()
    }

    /// Admission check at the clock's current instant.
    pub fn check(&self, client_key: &str) -> RateLimitDecision {
        self.check_and_record(client_key, self.clock.now_millis())
    }

    /// Prune the client's window, then admit and record `now` if the client
    /// is under quota. Rejected requests are not recorded.
    pub fn check_and_record(&self, client_key: &str, now: u64) -> RateLimitDecision {
        let limit = self.requests_limit as usize;

        let (admitted, count) = match self.windows.get_mut(client_key) {
            Some(mut window) => self.record(&mut window, now, limit),
            None => {
                let mut window = self.windows.entry(client_key.to_owned()).or_default();
                self.record(&mut window, now, limit)
            }
        };

        let remaining = limit.saturating_sub(count);
        RateLimitDecision {
            admitted,
            limit: self.requests_limit,
            remaining: u32::try_from(remaining).unwrap_or(u32::MAX),
            reset_at: now.saturating_add(self.window_millis) / 1000,
        }
    }

    /// Runs with the entry's shard lock held.
    fn record(&self, window: &mut ClientWindow, now: u64, limit: usize) -> (bool, usize) {
        window.prune(now, self.window_millis);
        if window.len() >= limit {
            return (false, window.len());
        }
        window.timestamps.push_back(now);
        (true, window.len())
    }

    /// Prune every window and drop clients left with no recent requests.
    ///
    /// Returns the number of clients removed. Admission outcomes are unchanged:
    /// an empty window and a missing one behave identically.
    pub fn sweep(&self) -> usize {
        self.sweep_at(self.clock.now_millis())
    }

    pub fn sweep_at(&self, now: u64) -> usize {
        let mut removed = 0;
        self.windows.retain(|_, window| {
            window.prune(now, self.window_millis);
            let keep = !window.is_empty();
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Run [`sweep`](Self::sweep) every `interval` until shutdown fires.
    pub fn spawn_sweeper(
        state: Arc<Self>,
        interval: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = state.sweep();
                        let clients = state.client_count();
                        metrics::set_rate_limit_clients(clients);
                        tracing::debug!(removed, clients, "Swept idle rate limit windows");
                    }
                    _ = shutdown.recv() => {
                        tracing::debug!("Rate limit sweeper stopping");
                        break;
                    }
                }
            }
        })
    }
}

/// Derive the rate limit key from the connection's source address.
pub fn client_key<B>(request: &Request<B>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Middleware enforcing the per-client quota.
///
/// Rejected requests get a 429 without reaching the handler. Both outcomes
/// carry the `X-RateLimit-*` headers.
pub async fn rate_limit_middleware(
    State(state): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(&request);
    let decision = state.check(&key);

    let mut response = if decision.admitted {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, limit = decision.limit, "Rate limit exceeded");
        metrics::record_rate_limited();
        (StatusCode::TOO_MANY_REQUESTS, REJECTION_BODY).into_response()
    };

    decision.apply_headers(response.headers_mut());
    response
}
