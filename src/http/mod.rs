//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: trace, CORS, timeout, body limit)
//!     → handlers.rs (/health, /proxy, /debug, fallback)
//!     → proxy::ProxyPipeline (forward)
//!     → response.rs (relayed response or JSON error)
//!     → Send to client
//! ```

pub mod handlers;
pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
