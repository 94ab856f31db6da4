//! Route handlers.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::InboundRequest;

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "OK", "timestamp": timestamp() }))
}

/// The forwarding endpoint.
pub async fn proxy(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let inbound = InboundRequest::new(method.clone(), uri.query(), headers, body);

    match state.pipeline.handle(inbound).await {
        Ok(response) => {
            let status = response.status.as_u16();
            tracing::info!(
                method = %method,
                status,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Proxied request"
            );
            metrics::record_request(method.as_str(), status, "forwarded", start);
            response.into_response()
        }
        Err(e) => {
            let status = e.status().as_u16();
            tracing::info!(
                method = %method,
                status,
                kind = e.kind().as_str(),
                error = %e,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Proxy request failed"
            );
            metrics::record_request(method.as_str(), status, e.kind().as_str(), start);
            e.into_response()
        }
    }
}

/// Echo what the proxy received, for checking what a client sends.
pub async fn debug(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let mut header_map = Map::new();
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        header_map.insert(name.as_str().to_string(), Value::from(joined));
    }

    let mut query = Map::new();
    for (key, value) in url::form_urlencoded::parse(uri.query().unwrap_or("").as_bytes()) {
        let value = Value::from(value.into_owned());
        match query.get_mut(key.as_ref()) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => *existing = Value::Array(vec![existing.take(), value]),
            None => {
                query.insert(key.into_owned(), value);
            }
        }
    }

    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::from(String::from_utf8_lossy(&body).into_owned()))
    };

    Json(json!({
        "method": method.as_str(),
        "headers": header_map,
        "query": query,
        "body": body,
        "timestamp": timestamp(),
    }))
}

/// Catch-all with a usage hint.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "message": "Use /proxy?url=<target_url> to proxy requests",
            "examples": {
                "GET": "/proxy?url=https://api.github.com/users/octocat",
                "POST": "/proxy?url=https://httpbin.org/post",
            },
        })),
    )
}
