//! Upstream request execution.
//!
//! # Responsibilities
//! - Send the outbound request with its per-request timeout
//! - Buffer the upstream response
//! - Classify transport failures without interpreting upstream status
//!
//! # Design Decisions
//! - `Transport` is the seam between the pipeline and the network
//! - No retries: a single failed attempt is terminal
//! - Bodies are never decompressed, so `content-encoding` stays truthful

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::proxy::builder::OutboundRequest;

/// An upstream response. Any status, 1xx to 5xx, is a response.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Result of one upstream attempt.
#[derive(Debug)]
pub enum ForwardOutcome {
    Response(ProxyResponse),
    /// Timeout, DNS failure, refused or reset connection.
    Unreachable(String),
    /// The transport rejected the request before sending it.
    Local(String),
}

/// Executes outbound requests.
pub trait Transport: Send + Sync {
    fn execute(&self, request: OutboundRequest) -> BoxFuture<'_, ForwardOutcome>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(connect_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }

    async fn send(&self, request: OutboundRequest) -> ForwardOutcome {
        let url = request.url();
        let mut builder = self
            .client
            .request(request.method, url)
            .headers(request.headers)
            .timeout(request.timeout);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return classify(e),
        };

        let status = response.status();
        let headers = response.headers().clone();
        match response.bytes().await {
            Ok(body) => ForwardOutcome::Response(ProxyResponse {
                status,
                headers,
                body,
            }),
            Err(e) => classify(e),
        }
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: OutboundRequest) -> BoxFuture<'_, ForwardOutcome> {
        self.send(request).boxed()
    }
}

fn classify(error: reqwest::Error) -> ForwardOutcome {
    if error.is_builder() {
        return ForwardOutcome::Local(error.to_string());
    }
    let reason = if error.is_timeout() {
        format!("timed out: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };
    ForwardOutcome::Unreachable(reason)
}
