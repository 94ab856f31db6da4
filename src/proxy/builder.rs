//! Outbound request construction.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use url::Url;

use crate::proxy::inbound::InboundRequest;
use crate::rules::RuleSet;

/// Methods whose body is forwarded.
const BODY_METHODS: [Method; 3] = [Method::POST, Method::PUT, Method::PATCH];

/// A fully prepared upstream request. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    /// The validated target, before passthrough parameters are appended.
    pub target: Url,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<Bytes>,
    pub timeout: Duration,
}

impl OutboundRequest {
    /// The target URL with passthrough parameters appended to its own query.
    pub fn url(&self) -> Url {
        let mut url = self.target.clone();
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        url
    }
}

/// Assembles outbound requests with the configured default timeout.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    default_timeout: Duration,
}

impl RequestBuilder {
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }

    pub fn build(
        &self,
        inbound: InboundRequest,
        target: Url,
        headers: HeaderMap,
        rules: Option<&RuleSet>,
    ) -> OutboundRequest {
        let body = BODY_METHODS
            .contains(&inbound.method)
            .then_some(inbound.body);
        let timeout = rules
            .and_then(|r| r.timeout)
            .unwrap_or(self.default_timeout);

        OutboundRequest {
            method: inbound.method,
            target,
            headers,
            query: inbound.query,
            body,
            timeout,
        }
    }
}
