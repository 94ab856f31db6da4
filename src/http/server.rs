//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, body limit, CORS on local routes)
//! - Compile the rule table and build the forwarding pipeline
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::config::ProxyConfig;
use crate::http::handlers;
use crate::lifecycle::signals::shutdown_signal;
use crate::lifecycle::StartupError;
use crate::proxy::{HttpTransport, ProxyPipeline, RequestBuilder, Transport};
use crate::rules::{HeaderRuleEngine, RuleTable};

/// Headroom between the longest upstream timeout and the handler timeout.
const HANDLER_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ProxyPipeline>,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server that forwards over the network.
    pub fn new(config: ProxyConfig) -> Result<Self, StartupError> {
        let transport = HttpTransport::new(Duration::from_secs(config.timeouts.connect_secs))?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a server with a custom upstream transport.
    pub fn with_transport(
        config: ProxyConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, StartupError> {
        let table = RuleTable::from_config(&config).map_err(StartupError::Rules)?;
        let default_timeout = Duration::from_secs(config.timeouts.request_secs);
        let handler_timeout =
            table.max_timeout().unwrap_or_default().max(default_timeout) + HANDLER_TIMEOUT_MARGIN;

        tracing::info!(
            rule_sets = table.len(),
            default_timeout_secs = config.timeouts.request_secs,
            "Rule table loaded"
        );

        let pipeline = ProxyPipeline::new(
            HeaderRuleEngine::new(Arc::new(table)),
            RequestBuilder::new(default_timeout),
            transport,
        );
        let state = AppState {
            pipeline: Arc::new(pipeline),
        };

        let router = Self::build_router(&config, state, handler_timeout);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState, handler_timeout: Duration) -> Router {
        // Relayed responses keep upstream access-control headers untouched.
        let local = Router::new()
            .route("/health", get(handlers::health))
            .route("/debug", any(handlers::debug))
            .fallback(handlers::not_found)
            .layer(CorsLayer::permissive());

        Router::new()
            .route("/proxy", any(handlers::proxy))
            .merge(local)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(TimeoutLayer::new(handler_timeout))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }))
    }

    /// The configured router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl+C, SIGTERM, or the shutdown broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {},
                    _ = shutdown.recv() => {},
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
