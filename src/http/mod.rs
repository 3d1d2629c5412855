//! HTTP surface of the relay.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, tower-http trace + timeout layers)
//!     → request.rs (assign X-Request-ID)
//!     → service_log.rs (one structured record per request)
//!     → auth.rs (IP whitelist, authorization code)
//!     → handlers → RelayPipeline
//!     → response.rs / RelayError (JSON bodies)
//! ```

pub mod auth;
pub mod request;
pub mod response;
pub mod server;
pub mod service_log;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
