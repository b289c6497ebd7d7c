//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, resolve the upstream
/// credential from the environment and validate the result.
///
/// Without a path the built-in defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    resolve_credential(&mut config, |name| std::env::var(name).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Fill `upstream.api_key` from `lookup(upstream.api_key_env)` when the file
/// did not provide one. Returns `true` if the environment supplied it.
///
/// Runs before logging is initialised, so nothing is logged here.
pub fn resolve_credential<F>(config: &mut GatewayConfig, lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    if config.upstream.api_key.is_some() {
        return false;
    }
    match lookup(&config.upstream.api_key_env) {
        Some(key) => {
            config.upstream.api_key = Some(key);
            true
        }
        None => false,
    }
}
