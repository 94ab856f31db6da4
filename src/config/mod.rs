//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + CLI/env overrides
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → rule sets compiled into a RuleTable shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the rule table is never reloaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    HostMatch, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig, RewriteConfig,
    RuleSetConfig, SecurityConfig, SetIfAbsentConfig, TimeoutConfig, ValuePredicate, ValueSource,
};
pub use validation::{validate_config, ValidationError};
