//! Pipeline results as HTTP responses.
//!
//! # Design Decisions
//! - Relayed responses keep upstream status, headers and bytes; axum frames the body
//! - Failures render as JSON with `error` and `message`, except mirrored
//!   statuses that forbid a body (1xx, 304), which render status-only

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::proxy::{ProxyError, ProxyResponse};

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if forbids_body(status) {
            return status.into_response();
        }
        (status, Json(self.payload())).into_response()
    }
}

fn forbids_body(status: StatusCode) -> bool {
    status.is_informational() || status == StatusCode::NOT_MODIFIED
}
