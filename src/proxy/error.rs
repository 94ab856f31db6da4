//! Failure classification.
//!
//! Every pipeline failure maps to one [`ErrorKind`] with a fixed status rule
//! and a JSON payload carrying `error` and `message`.

use axum::body::Bytes;
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Coarse failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Client error; the upstream is never contacted.
    InvalidInput,
    /// The upstream answered with a non-2xx status.
    UpstreamHttpError,
    /// No upstream status was obtained (timeout, DNS, connection).
    UpstreamUnreachable,
    /// Request construction failed inside the proxy.
    LocalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::UpstreamHttpError => "upstream_http_error",
            ErrorKind::UpstreamUnreachable => "upstream_unreachable",
            ErrorKind::LocalError => "local_error",
        }
    }
}

/// Errors produced by the forwarding pipeline.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Missing URL parameter. Use /proxy?url=<target_url>")]
    MissingUrl,

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    #[error("Unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("Request failed with status code {}", .status.as_u16())]
    UpstreamStatus { status: StatusCode, body: Bytes },

    #[error("No response received from target server: {0}")]
    Unreachable(String),

    #[error("{0}")]
    Local(String),
}

/// JSON body sent to the client on failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: Value,
}

impl ProxyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProxyError::MissingUrl | ProxyError::InvalidUrl(_) | ProxyError::UnsupportedScheme(_) => {
                ErrorKind::InvalidInput
            }
            ProxyError::UpstreamStatus { .. } => ErrorKind::UpstreamHttpError,
            ProxyError::Unreachable(_) => ErrorKind::UpstreamUnreachable,
            ProxyError::Local(_) => ErrorKind::LocalError,
        }
    }

    /// Status code returned to the proxy client.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::UpstreamStatus { status, .. } => *status,
            _ => match self.kind() {
                ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
                ErrorKind::UpstreamUnreachable => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn payload(&self) -> ErrorPayload {
        match self {
            ProxyError::MissingUrl => ErrorPayload {
                error: "Missing URL parameter",
                status: None,
                message: Value::from("Use /proxy?url=<target_url>"),
            },
            ProxyError::InvalidUrl(reason) => ErrorPayload {
                error: "Invalid URL format",
                status: None,
                message: Value::from(reason.as_str()),
            },
            ProxyError::UnsupportedScheme(scheme) => ErrorPayload {
                error: "Invalid URL format",
                status: None,
                message: Value::from(format!(
                    "Unsupported URL scheme '{}'; only http and https targets can be proxied",
                    scheme
                )),
            },
            ProxyError::UpstreamStatus { status, body } => ErrorPayload {
                error: "Proxy request failed",
                status: Some(status.as_u16()),
                message: upstream_message(body).unwrap_or_else(|| Value::from(self.to_string())),
            },
            ProxyError::Unreachable(_) => ErrorPayload {
                error: "Service unavailable",
                status: None,
                message: Value::from("No response received from target server"),
            },
            ProxyError::Local(reason) => ErrorPayload {
                error: "Internal server error",
                status: None,
                message: Value::from(reason.as_str()),
            },
        }
    }
}

/// The upstream failure body: parsed JSON when possible, text otherwise.
fn upstream_message(body: &Bytes) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice(body)
        .ok()
        .or_else(|| Some(Value::from(String::from_utf8_lossy(body).into_owned())))
}
