//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, bind address parses)
//! - Reject rule sets whose header names or values cannot be sent
//! - Detect duplicate rule set names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue, Method};
use thiserror::Error;

use crate::config::schema::{ProxyConfig, RuleSetConfig, ValueSource};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("rule set '{0}' has an empty host")]
    EmptyHost(String),

    #[error("rule set '{rule}' host '{host}' must not include a port or path")]
    HostPort { rule: String, host: String },

    #[error("rule set '{rule}' has a zero timeout")]
    ZeroRuleTimeout { rule: String },

    #[error("rule set '{rule}' uses invalid header name '{header}'")]
    HeaderName { rule: String, header: String },

    #[error("rule set '{rule}' has an invalid value for header '{header}'")]
    HeaderValue { rule: String, header: String },

    #[error("rule set '{rule}' uses invalid method '{method}'")]
    Method { rule: String, method: String },

    #[error("duplicate rule set name '{0}'")]
    DuplicateRule(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let mut names = HashSet::new();
    for rule in &config.rules {
        if !names.insert(rule.name.as_str()) {
            errors.push(ValidationError::DuplicateRule(rule.name.clone()));
        }
        validate_rule(rule, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Rule hosts are compared against the URL host, which never carries a port.
fn is_bare_host(host: &str) -> bool {
    if host.starts_with('[') {
        return host.ends_with(']') && !host[1..host.len() - 1].contains(['[', ']', '/']);
    }
    !host.contains([':', '/'])
}

fn validate_rule(rule: &RuleSetConfig, errors: &mut Vec<ValidationError>) {
    let host = rule.host.trim();
    if host.is_empty() {
        errors.push(ValidationError::EmptyHost(rule.name.clone()));
    } else if !is_bare_host(host) {
        errors.push(ValidationError::HostPort {
            rule: rule.name.clone(),
            host: rule.host.clone(),
        });
    }
    if rule.timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroRuleTimeout { rule: rule.name.clone() });
    }

    let header_names = rule
        .remove
        .iter()
        .chain(rule.rewrite.iter().map(|r| &r.header))
        .chain(rule.set_if_absent.iter().map(|s| &s.header));
    for header in header_names {
        if HeaderName::from_bytes(header.as_bytes()).is_err() {
            errors.push(ValidationError::HeaderName {
                rule: rule.name.clone(),
                header: header.clone(),
            });
        }
    }

    let values = rule
        .rewrite
        .iter()
        .map(|r| (&r.header, &r.value))
        .chain(rule.set_if_absent.iter().map(|s| (&s.header, &s.value)));
    for (header, value) in values {
        if let ValueSource::Literal(literal) = value {
            if HeaderValue::from_str(literal).is_err() {
                errors.push(ValidationError::HeaderValue {
                    rule: rule.name.clone(),
                    header: header.clone(),
                });
            }
        }
    }

    for method in rule.set_if_absent.iter().flat_map(|s| s.methods.iter()) {
        if Method::from_bytes(method.to_ascii_uppercase().as_bytes()).is_err() {
            errors.push(ValidationError::Method {
                rule: rule.name.clone(),
                method: method.clone(),
            });
        }
    }
}
