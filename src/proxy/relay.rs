//! Response relay: header filtering, verbatim status and body.

use axum::http::HeaderMap;

use crate::proxy::forwarder::ProxyResponse;

/// Upstream response headers never relayed to the client.
pub const EXCLUDED_RESPONSE_HEADERS: &[&str] = &[
    "content-length",
    "transfer-encoding",
    "connection",
    "keep-alive",
    "server",
];

pub fn is_excluded_response_header(name: &str) -> bool {
    EXCLUDED_RESPONSE_HEADERS
        .iter()
        .any(|h| name.eq_ignore_ascii_case(h))
}

/// Drop excluded headers; status and body pass through untouched.
pub fn relay(response: ProxyResponse) -> ProxyResponse {
    let mut headers = HeaderMap::with_capacity(response.headers.len());
    for (name, value) in &response.headers {
        if !is_excluded_response_header(name.as_str()) {
            headers.append(name.clone(), value.clone());
        }
    }
    ProxyResponse {
        status: response.status,
        headers,
        body: response.body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{HeaderValue, StatusCode};

    #[test]
    fn test_relay_filters_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("content-length", HeaderValue::from_static("5"));
        headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        headers.insert("connection", HeaderValue::from_static("close"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("server", HeaderValue::from_static("cloudflare"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.insert("content-encoding", HeaderValue::from_static("gzip"));
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));

        let out = relay(ProxyResponse {
            status: StatusCode::CREATED,
            headers,
            body: Bytes::from_static(b"hello"),
        });

        assert_eq!(out.status, StatusCode::CREATED);
        assert_eq!(out.body, Bytes::from_static(b"hello"));
        for name in EXCLUDED_RESPONSE_HEADERS {
            assert!(!out.headers.contains_key(*name), "{name} relayed");
        }
        assert_eq!(out.headers["content-type"], "application/json");
        assert_eq!(out.headers["content-encoding"], "gzip");
        let cookies: Vec<_> = out.headers.get_all("set-cookie").iter().collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);
    }
}
