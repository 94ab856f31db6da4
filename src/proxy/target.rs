//! Target URL validation. Purely syntactic; no network access.

use url::Url;

use crate::proxy::error::ProxyError;

/// Parse the `url` parameter into an absolute http(s) URL with a host.
pub fn validate_target(raw: Option<&str>) -> Result<Url, ProxyError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or(ProxyError::MissingUrl)?;

    let url = Url::parse(raw).map_err(|e| ProxyError::InvalidUrl(e.to_string()))?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ProxyError::InvalidUrl(format!("'{}' has no host", raw)));
    }
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ProxyError::UnsupportedScheme(other.to_string())),
    }
}
