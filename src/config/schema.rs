//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the forwarding proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, public hosts).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Per-domain header rule sets. Replaces the built-in table when present.
    pub rules: Vec<RuleSetConfig>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            security: SecurityConfig::default(),
            observability: ObservabilityConfig::default(),
            rules: crate::rules::defaults::builtin_rules(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Hostnames the proxy is reachable under. An `origin` or `referer`
    /// naming one of these reveals the proxy to the target.
    pub public_hosts: Vec<String>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            public_hosts: Vec::new(),
        }
    }
}

impl ListenerConfig {
    /// Replace the port of the bind address, keeping the interface.
    pub fn set_port(&mut self, port: u16) {
        let host = match self.bind_address.rsplit_once(':') {
            Some((host, _)) => host.to_string(),
            None => "0.0.0.0".to_string(),
        };
        self.bind_address = format!("{}:{}", host, port);
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Default upstream request timeout in seconds. Rule sets may override it.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 30,
        }
    }
}

/// Request limit configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// How a rule set's host is compared with the target host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HostMatch {
    Exact,
    /// Matches the host itself and any subdomain of it.
    #[default]
    Suffix,
}

/// A named set of header transformations for one target domain.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleSetConfig {
    /// Rule set identifier for logging.
    pub name: String,

    /// Target host to match.
    pub host: String,

    /// Host comparison mode.
    #[serde(default, rename = "match")]
    pub host_match: HostMatch,

    /// Rule set priority (higher = checked first).
    #[serde(default)]
    pub priority: u32,

    /// Upstream timeout override in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Headers stripped unconditionally.
    #[serde(default)]
    pub remove: Vec<String>,

    /// Headers rewritten when their current value matches a predicate.
    #[serde(default)]
    pub rewrite: Vec<RewriteConfig>,

    /// Headers injected only when the client left them empty.
    #[serde(default)]
    pub set_if_absent: Vec<SetIfAbsentConfig>,
}

/// A conditional header rewrite.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RewriteConfig {
    pub header: String,
    pub when: ValuePredicate,
    pub value: ValueSource,
}

/// A default header value.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SetIfAbsentConfig {
    pub header: String,
    pub value: ValueSource,

    /// Restrict the default to these methods. Empty means every method.
    #[serde(default)]
    pub methods: Vec<String>,
}

/// Condition over a header's current value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuePredicate {
    /// The value names the proxy's own host.
    ProxyHost,
    /// The value is a known non-browser client signature.
    NonBrowserAgent,
    /// ASCII case-insensitive equality.
    Equals(String),
    /// ASCII case-insensitive substring.
    Contains(String),
}

/// Where a rule's header value comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    Literal(String),
    /// `scheme://host[:port]` of the target URL.
    TargetOrigin,
    /// The target origin followed by `/`.
    TargetRoot,
}
