//! Header rule engine.
//!
//! # Responsibilities
//! - Strip hop-by-hop and proxy-revealing request headers
//! - Apply the matching rule set: remove, rewrite, then set-if-absent
//!
//! # Design Decisions
//! - Pure function of (method, target, inbound headers); the inbound map is never mutated
//! - Idempotent: applying the engine to its own output changes nothing
//! - `proxy_host` checks use the inbound `Host` captured before it is stripped

use std::sync::Arc;

use axum::http::{header, HeaderMap, HeaderValue, Method};
use url::Url;

use crate::config::ValuePredicate;
use crate::rules::defaults::is_non_browser_agent;
use crate::rules::rule_set::{RuleSet, RuleTable, ValueTemplate};

/// Request headers never forwarded to the upstream.
pub const STRIPPED_REQUEST_HEADERS: &[&str] = &[
    "host",
    "content-length",
    "x-real-ip",
    "forwarded",
    // hop-by-hop
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

const FORWARDED_PREFIX: &str = "x-forwarded-";

/// Returns true if the request header is dropped before any rule runs.
pub fn is_stripped_request_header(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.starts_with(FORWARDED_PREFIX) || STRIPPED_REQUEST_HEADERS.contains(&name.as_str())
}

/// Values a rule may need from the request being forwarded.
struct RuleContext<'a> {
    method: &'a Method,
    target: &'a Url,
    proxy_hosts: Vec<String>,
}

impl RuleContext<'_> {
    fn resolve(&self, template: &ValueTemplate) -> Option<HeaderValue> {
        match template {
            ValueTemplate::Literal(value) => Some(value.clone()),
            ValueTemplate::TargetOrigin => {
                HeaderValue::from_str(&self.target.origin().ascii_serialization()).ok()
            }
            ValueTemplate::TargetRoot => {
                let root = format!("{}/", self.target.origin().ascii_serialization());
                HeaderValue::from_str(&root).ok()
            }
        }
    }

    fn matches(&self, predicate: &ValuePredicate, value: &str) -> bool {
        match predicate {
            ValuePredicate::ProxyHost => host_of(value)
                .is_some_and(|host| self.proxy_hosts.iter().any(|p| *p == host)),
            ValuePredicate::NonBrowserAgent => is_non_browser_agent(value),
            ValuePredicate::Equals(expected) => value.trim().eq_ignore_ascii_case(expected),
            ValuePredicate::Contains(needle) => value
                .to_ascii_lowercase()
                .contains(&needle.to_ascii_lowercase()),
        }
    }
}

/// Applies the generic strip plus the per-domain rule set.
#[derive(Debug, Clone)]
pub struct HeaderRuleEngine {
    table: Arc<RuleTable>,
}

impl HeaderRuleEngine {
    pub fn new(table: Arc<RuleTable>) -> Self {
        Self { table }
    }

    /// The rule set matching the target host, if any.
    pub fn rule_set_for(&self, target: &Url) -> Option<&RuleSet> {
        target.host_str().and_then(|host| self.table.lookup(host))
    }

    /// Produce the outbound header map for a request to `target`.
    pub fn apply(&self, method: &Method, target: &Url, inbound: &HeaderMap) -> HeaderMap {
        let ctx = RuleContext {
            method,
            target,
            proxy_hosts: self.proxy_hosts(inbound),
        };

        let mut headers = strip_generic(inbound);

        let Some(rules) = self.rule_set_for(target) else {
            return headers;
        };

        for name in &rules.remove {
            headers.remove(name);
        }

        for rewrite in &rules.rewrite {
            let hit = headers
                .get_all(&rewrite.header)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .any(|v| ctx.matches(&rewrite.when, v));
            if hit {
                if let Some(value) = ctx.resolve(&rewrite.value) {
                    headers.insert(rewrite.header.clone(), value);
                }
            }
        }

        for default in &rules.set_if_absent {
            if headers.contains_key(&default.header) || !default.applies_to(ctx.method) {
                continue;
            }
            if let Some(value) = ctx.resolve(&default.value) {
                headers.insert(default.header.clone(), value);
            }
        }

        headers
    }

    fn proxy_hosts(&self, inbound: &HeaderMap) -> Vec<String> {
        let mut hosts: Vec<String> = self
            .table
            .public_hosts()
            .iter()
            .filter_map(|h| host_of(h))
            .collect();
        if let Some(host) = inbound
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .and_then(host_of)
        {
            hosts.push(host);
        }
        hosts
    }
}

/// Copy every header except the generic strip set.
fn strip_generic(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        if !is_stripped_request_header(name.as_str()) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

/// Lowercase host of a URL, origin, or bare `host[:port]` value, without the port.
fn host_of(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("null") {
        return None;
    }
    if let Ok(url) = Url::parse(value) {
        if let Some(host) = url.host_str() {
            return Some(host.trim_matches(['[', ']']).to_ascii_lowercase());
        }
    }
    let authority = value.split('/').next().unwrap_or(value);
    let host = if let Some(rest) = authority.strip_prefix('[') {
        rest.split(']').next().unwrap_or(rest)
    } else {
        authority.split(':').next().unwrap_or(authority)
    };
    (!host.is_empty()).then(|| host.to_ascii_lowercase())
}
