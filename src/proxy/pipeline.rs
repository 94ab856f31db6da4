//! The forwarding pipeline.
//!
//! ```text
//! InboundRequest
//!     → target.rs (validate url)
//!     → rules (sanitize headers)
//!     → builder.rs (outbound request)
//!     → forwarder.rs (one upstream attempt)
//!     → relay.rs on 2xx | error.rs otherwise
//! ```

use std::sync::Arc;

use crate::proxy::builder::RequestBuilder;
use crate::proxy::error::ProxyError;
use crate::proxy::forwarder::{ForwardOutcome, ProxyResponse, Transport};
use crate::proxy::inbound::InboundRequest;
use crate::proxy::relay::relay;
use crate::proxy::target::validate_target;
use crate::rules::HeaderRuleEngine;

/// Stateless request handler shared by all connections.
#[derive(Clone)]
pub struct ProxyPipeline {
    engine: HeaderRuleEngine,
    builder: RequestBuilder,
    transport: Arc<dyn Transport>,
}

impl ProxyPipeline {
    pub fn new(engine: HeaderRuleEngine, builder: RequestBuilder, transport: Arc<dyn Transport>) -> Self {
        Self {
            engine,
            builder,
            transport,
        }
    }

    /// Forward one request. Each stage short-circuits on failure.
    pub async fn handle(&self, inbound: InboundRequest) -> Result<ProxyResponse, ProxyError> {
        let target = validate_target(inbound.target.as_deref())?;

        let rules = self.engine.rule_set_for(&target);
        if let Some(rules) = rules {
            tracing::debug!(rule_set = %rules.name, host = ?target.host_str(), "Rule set matched");
        }

        let headers = self.engine.apply(&inbound.method, &target, &inbound.headers);
        let outbound = self.builder.build(inbound, target, headers, rules);

        tracing::debug!(
            method = %outbound.method,
            url = %outbound.url(),
            timeout_ms = outbound.timeout.as_millis() as u64,
            headers = ?outbound.headers,
            "Forwarding request"
        );

        match self.transport.execute(outbound).await {
            ForwardOutcome::Response(response) if response.status.is_success() => {
                tracing::debug!(
                    status = %response.status,
                    bytes = response.body.len(),
                    "Upstream responded"
                );
                Ok(relay(response))
            }
            ForwardOutcome::Response(response) => {
                tracing::warn!(
                    status = %response.status,
                    cf_ray = ?response.headers.get("cf-ray"),
                    server = ?response.headers.get("server"),
                    "Upstream returned failure status"
                );
                Err(ProxyError::UpstreamStatus {
                    status: response.status,
                    body: response.body,
                })
            }
            ForwardOutcome::Unreachable(reason) => {
                tracing::warn!(reason = %reason, "Upstream unreachable");
                Err(ProxyError::Unreachable(reason))
            }
            ForwardOutcome::Local(reason) => {
                tracing::error!(reason = %reason, "Outbound request rejected locally");
                Err(ProxyError::Local(reason))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use axum::body::Bytes;
    use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
    use futures_util::future::BoxFuture;
    use futures_util::FutureExt;

    use crate::config::ProxyConfig;
    use crate::proxy::builder::OutboundRequest;
    use crate::proxy::error::ErrorKind;
    use crate::rules::RuleTable;

    /// Records requests and answers with a canned outcome.
    struct Recorder {
        calls: AtomicUsize,
        seen: Mutex<Vec<OutboundRequest>>,
        reply: fn() -> ForwardOutcome,
    }

    impl Transport for Recorder {
        fn execute(&self, request: OutboundRequest) -> BoxFuture<'_, ForwardOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request);
            let reply = self.reply;
            async move { reply() }.boxed()
        }
    }

    fn pipeline(reply: fn() -> ForwardOutcome) -> (ProxyPipeline, Arc<Recorder>) {
        let recorder = Arc::new(Recorder {
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            reply,
        });
        let table = RuleTable::from_config(&ProxyConfig::default()).unwrap();
        let pipeline = ProxyPipeline::new(
            HeaderRuleEngine::new(Arc::new(table)),
            RequestBuilder::new(Duration::from_secs(30)),
            recorder.clone(),
        );
        (pipeline, recorder)
    }

    fn ok() -> ForwardOutcome {
        let mut headers = HeaderMap::new();
        headers.insert("server", HeaderValue::from_static("nginx"));
        headers.insert("content-type", HeaderValue::from_static("text/plain"));
        ForwardOutcome::Response(ProxyResponse {
            status: StatusCode::OK,
            headers,
            body: Bytes::from_static(b"ok"),
        })
    }

    fn not_found() -> ForwardOutcome {
        ForwardOutcome::Response(ProxyResponse {
            status: StatusCode::NOT_FOUND,
            headers: HeaderMap::new(),
            body: Bytes::from_static(br#"{"msg":"not found"}"#),
        })
    }

    fn refused() -> ForwardOutcome {
        ForwardOutcome::Unreachable("connection refused".into())
    }

    fn inbound(query: &str) -> InboundRequest {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("localhost:8080"));
        headers.insert("accept", HeaderValue::from_static("*/*"));
        InboundRequest::new(Method::GET, Some(query), headers, Bytes::new())
    }

    #[tokio::test]
    async fn test_invalid_input_never_contacts_upstream() {
        let (pipeline, recorder) = pipeline(ok);

        for query in ["", "page=2", "url=", "url=not%20a%20url", "url=%2Frelative%2Fpath"] {
            let err = pipeline.handle(inbound(query)).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{query}");
        }
        assert_eq!(recorder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_is_relayed() {
        let (pipeline, recorder) = pipeline(ok);

        let response = pipeline
            .handle(inbound("url=https://example.org/data&page=2"))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, Bytes::from_static(b"ok"));
        assert!(!response.headers.contains_key("server"));

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url().as_str(), "https://example.org/data?page=2");
        assert!(!seen[0].headers.contains_key("host"));
        assert_eq!(seen[0].headers["accept"], "*/*");
    }

    #[tokio::test]
    async fn test_failure_status_is_classified() {
        let (pipeline, _) = pipeline(not_found);
        let err = pipeline
            .handle(inbound("url=https://example.org/missing"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamHttpError);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unreachable_is_classified() {
        let (pipeline, recorder) = pipeline(refused);
        let err = pipeline
            .handle(inbound("url=http://127.0.0.1:1/"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        // no retry
        assert_eq!(recorder.calls.load(Ordering::SeqCst), 1);
    }
}
