//! Compiled rule sets and the rule table.
//!
//! # Design Decisions
//! - Header names and literal values are parsed once at startup
//! - Immutable after construction (thread-safe without locks)
//! - First match wins, ordered by priority then declaration order

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method};

use crate::config::{ProxyConfig, RuleSetConfig, ValidationError, ValuePredicate, ValueSource};
use crate::rules::matcher::HostMatcher;

/// A compiled header value source.
#[derive(Debug, Clone)]
pub enum ValueTemplate {
    Literal(HeaderValue),
    TargetOrigin,
    TargetRoot,
}

/// A compiled conditional rewrite.
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub header: HeaderName,
    pub when: ValuePredicate,
    pub value: ValueTemplate,
}

/// A compiled default header.
#[derive(Debug, Clone)]
pub struct HeaderDefault {
    pub header: HeaderName,
    pub value: ValueTemplate,
    /// Empty means every method.
    pub methods: Vec<Method>,
}

impl HeaderDefault {
    pub fn applies_to(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }
}

/// Header transformations scoped to one target domain.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub name: String,
    pub matcher: HostMatcher,
    pub priority: u32,
    pub timeout: Option<Duration>,
    pub remove: Vec<HeaderName>,
    pub rewrite: Vec<Rewrite>,
    pub set_if_absent: Vec<HeaderDefault>,
}

impl RuleSet {
    /// Compile a rule set from configuration.
    pub fn compile(config: &RuleSetConfig) -> Result<Self, ValidationError> {
        let remove = config
            .remove
            .iter()
            .map(|h| header_name(config, h))
            .collect::<Result<Vec<_>, _>>()?;

        let rewrite = config
            .rewrite
            .iter()
            .map(|r| {
                Ok(Rewrite {
                    header: header_name(config, &r.header)?,
                    when: r.when.clone(),
                    value: template(config, &r.header, &r.value)?,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        let set_if_absent = config
            .set_if_absent
            .iter()
            .map(|s| {
                let methods = s
                    .methods
                    .iter()
                    .map(|m| {
                        Method::from_bytes(m.to_ascii_uppercase().as_bytes()).map_err(|_| {
                            ValidationError::Method {
                                rule: config.name.clone(),
                                method: m.clone(),
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(HeaderDefault {
                    header: header_name(config, &s.header)?,
                    value: template(config, &s.header, &s.value)?,
                    methods,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(Self {
            name: config.name.clone(),
            matcher: HostMatcher::new(config.host.clone(), config.host_match),
            priority: config.priority,
            timeout: config.timeout_secs.map(Duration::from_secs),
            remove,
            rewrite,
            set_if_absent,
        })
    }
}

fn header_name(rule: &RuleSetConfig, header: &str) -> Result<HeaderName, ValidationError> {
    HeaderName::from_bytes(header.as_bytes()).map_err(|_| ValidationError::HeaderName {
        rule: rule.name.clone(),
        header: header.to_string(),
    })
}

fn template(
    rule: &RuleSetConfig,
    header: &str,
    source: &ValueSource,
) -> Result<ValueTemplate, ValidationError> {
    Ok(match source {
        ValueSource::Literal(value) => {
            ValueTemplate::Literal(HeaderValue::from_str(value).map_err(|_| {
                ValidationError::HeaderValue {
                    rule: rule.name.clone(),
                    header: header.to_string(),
                }
            })?)
        }
        ValueSource::TargetOrigin => ValueTemplate::TargetOrigin,
        ValueSource::TargetRoot => ValueTemplate::TargetRoot,
    })
}

/// The process-wide table of rule sets.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<RuleSet>,
    public_hosts: Vec<String>,
}

impl RuleTable {
    /// Build a table from compiled rule sets.
    pub fn new(mut rules: Vec<RuleSet>, public_hosts: Vec<String>) -> Self {
        // stable: equal priorities keep declaration order
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        let public_hosts = public_hosts
            .iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        Self {
            rules,
            public_hosts,
        }
    }

    /// Compile every rule set in the configuration.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, Vec<ValidationError>> {
        let mut rules = Vec::with_capacity(config.rules.len());
        let mut errors = Vec::new();
        for rule in &config.rules {
            match RuleSet::compile(rule) {
                Ok(compiled) => rules.push(compiled),
                Err(e) => errors.push(e),
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self::new(rules, config.listener.public_hosts.clone()))
    }

    /// Look up the rule set for a target host.
    pub fn lookup(&self, host: &str) -> Option<&RuleSet> {
        self.rules.iter().find(|r| r.matcher.matches(host))
    }

    /// Hostnames the proxy is publicly reachable under.
    pub fn public_hosts(&self) -> &[String] {
        &self.public_hosts
    }

    /// Longest timeout override across all rule sets.
    pub fn max_timeout(&self) -> Option<Duration> {
        self.rules.iter().filter_map(|r| r.timeout).max()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
