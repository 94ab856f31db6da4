//! Inbound request model.

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};

/// Query parameter naming the upstream target.
pub const TARGET_PARAM: &str = "url";

/// A client request to the proxy endpoint.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    /// Raw value of the first `url` query parameter.
    pub target: Option<String>,
    pub headers: HeaderMap,
    /// Query parameters other than `url`, in request order.
    pub query: Vec<(String, String)>,
    pub body: Bytes,
}

impl InboundRequest {
    /// Split the raw query string into the target and the passthrough parameters.
    pub fn new(method: Method, raw_query: Option<&str>, headers: HeaderMap, body: Bytes) -> Self {
        let mut target = None;
        let mut query = Vec::new();

        for (key, value) in url::form_urlencoded::parse(raw_query.unwrap_or("").as_bytes()) {
            if key == TARGET_PARAM {
                if target.is_none() {
                    target = Some(value.into_owned());
                }
            } else {
                query.push((key.into_owned(), value.into_owned()));
            }
        }

        Self {
            method,
            target,
            headers,
            query,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_split() {
        let req = InboundRequest::new(
            Method::GET,
            Some("url=https%3A%2F%2Fexample.org%2Fdata&page=2&tag=a&url=ignored&tag=b"),
            HeaderMap::new(),
            Bytes::new(),
        );

        assert_eq!(req.target.as_deref(), Some("https://example.org/data"));
        assert_eq!(
            req.query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("tag".to_string(), "a".to_string()),
                ("tag".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_unencoded_target() {
        let req = InboundRequest::new(
            Method::GET,
            Some("url=https://example.org/data&page=2"),
            HeaderMap::new(),
            Bytes::new(),
        );
        assert_eq!(req.target.as_deref(), Some("https://example.org/data"));
        assert_eq!(req.query.len(), 1);
    }

    #[test]
    fn test_no_query() {
        let req = InboundRequest::new(Method::GET, None, HeaderMap::new(), Bytes::new());
        assert!(req.target.is_none());
        assert!(req.query.is_empty());
    }
}
