//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Apply command-line and environment overrides
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Without a config file the built-in defaults apply

use std::path::Path;

use thiserror::Error;

use crate::config::loader::join_errors;
use crate::config::{load_config, validate_config, ConfigError, ProxyConfig, ValidationError};

/// Errors that stop the proxy from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid rule table: {}", join_errors(.0))]
    Rules(Vec<ValidationError>),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Resolve the effective configuration from an optional file and port override.
pub fn resolve_config(path: Option<&Path>, port: Option<u16>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    if let Some(port) = port {
        config.listener.set_port(port);
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = resolve_config(None, None).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_port_override() {
        let config = resolve_config(None, Some(80)).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:80");
    }

    #[test]
    fn test_port_override_keeps_interface() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[listener]\nbind_address = \"127.0.0.1:3000\"\n").unwrap();

        let config = resolve_config(Some(file.path()), Some(4000)).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
    }
}
