//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (hardening headers added on the way out)
//!     → rate_limit.rs (per-IP sliding window, 429 on excess)
//!     → cors.rs (origin policy, preflight)
//!     → Pass to handlers
//! ```
//!
//! # Design Decisions
//! - Rate limiting is a synchronous in-memory gate; it never queues
//! - A missing client address shares the "unknown" bucket instead of failing
//! - Time comes from an injectable clock

pub mod clock;
pub mod cors;
pub mod headers;
pub mod rate_limit;

pub use clock::{Clock, ManualClock, SystemClock};
pub use rate_limit::{rate_limit_middleware, RateLimitDecision, RateLimiterState};
