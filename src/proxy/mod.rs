//! Forwarding pipeline subsystem.
//!
//! # Design Decisions
//! - Every entity is created per request and dropped after the response
//! - The only shared state is the read-only rule table
//! - Failures are values (`ForwardOutcome`, `ProxyError`), matched exhaustively

pub mod builder;
pub mod error;
pub mod forwarder;
pub mod inbound;
pub mod pipeline;
pub mod relay;
pub mod target;

pub use builder::{OutboundRequest, RequestBuilder};
pub use error::{ErrorKind, ErrorPayload, ProxyError};
pub use forwarder::{ForwardOutcome, HttpTransport, ProxyResponse, Transport};
pub use inbound::InboundRequest;
pub use pipeline::ProxyPipeline;
