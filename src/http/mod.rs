//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack, connect info)
//!     → request.rs (assign and propagate request ID)
//!     → security (headers, rate limit, CORS)
//!     → api handlers
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::HttpServer;
