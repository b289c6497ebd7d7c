//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, capacity > 0)
//! - Check the upstream URL and credential header are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Validate a loaded configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if !config.api_prefix.is_empty() && !config.api_prefix.starts_with('/') {
        errors.push(ValidationError::new("api_prefix", "must start with '/'"));
    }
    if config.api_prefix.contains('{') || config.api_prefix.contains('*') {
        errors.push(ValidationError::new(
            "api_prefix",
            "must not contain path parameters or wildcards",
        ));
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if url.scheme() != "http" && url.scheme() != "https" => {
            errors.push(ValidationError::new(
                "upstream.base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(url) if url.cannot_be_a_base() => {
            errors.push(ValidationError::new("upstream.base_url", "cannot be used as a base URL"));
        }
        Ok(_) => {}
        Err(e) => {
            errors.push(ValidationError::new("upstream.base_url", e.to_string()));
        }
    }

    if HeaderName::try_from(config.upstream.credential_header.as_str()).is_err() {
        errors.push(ValidationError::new(
            "upstream.credential_header",
            format!("'{}' is not a valid header name", config.upstream.credential_header),
        ));
    }

    match config.upstream.api_key.as_deref() {
        None => errors.push(ValidationError::new("upstream.api_key", "credential is not set")),
        Some(key) if key.trim().is_empty() => {
            errors.push(ValidationError::new("upstream.api_key", "credential is empty"))
        }
        Some(_) => {}
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.timeout_secs", "must be greater than 0"));
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "upstream.connect_timeout_secs",
            "must be greater than 0",
        ));
    }

    if config.rate_limit.enabled {
        if config.rate_limit.capacity == 0 {
            errors.push(ValidationError::new("rate_limit.capacity", "must be greater than 0"));
        }
        if config.rate_limit.refill_interval_ms == 0 {
            errors.push(ValidationError::new(
                "rate_limit.refill_interval_ms",
                "must be greater than 0",
            ));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.upstream.api_key = Some("key".into());
        config
    }

    #[test]
    fn test_defaults_with_credential_are_valid() {
        assert_eq!(validate_config(&valid_config()), Ok(()));
    }

    #[test]
    fn test_missing_credential_is_rejected() {
        let config = GatewayConfig::default();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "upstream.api_key"));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = valid_config();
        config.upstream.base_url = "ftp://example.com/todos".into();
        config.rate_limit.capacity = 0;
        config.rate_limit.refill_interval_ms = 0;
        config.upstream.credential_header = "bad header".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "upstream.base_url",
                "upstream.credential_header",
                "rate_limit.capacity",
                "rate_limit.refill_interval_ms",
            ]
        );
    }

    #[test]
    fn test_disabled_rate_limit_skips_bucket_checks() {
        let mut config = valid_config();
        config.rate_limit.enabled = false;
        config.rate_limit.capacity = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_prefix_must_be_absolute() {
        let mut config = valid_config();
        config.api_prefix = "api".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "api_prefix");

        config.api_prefix = String::new();
        assert!(validate_config(&config).is_ok());
    }
}
