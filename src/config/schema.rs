//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Path prefix all gateway routes are mounted under (e.g. "/api").
    pub api_prefix: String,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream REST resource the gateway forwards to.
    pub upstream: UpstreamConfig,

    /// Token bucket settings.
    pub rate_limit: RateLimitConfig,

    /// Cross-origin policy.
    pub cors: CorsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/api".to_string(),
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cors: CorsConfig::default(),
            timeouts: TimeoutConfig::default(),
            security: SecurityConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Upstream REST resource configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Collection URL; items live at `{base_url}/{id}`.
    pub base_url: String,

    /// Credential sent on mutating calls. Never written back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Environment variable consulted when `api_key` is not set in the file.
    pub api_key_env: String,

    /// Header name carrying the credential.
    pub credential_header: String,

    /// Upper bound for a single upstream call in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://jsonplaceholder.typicode.com/todos".to_string(),
            api_key: None,
            api_key_env: "DATA_API_KEY".to_string(),
            credential_header: "API_KEY".to_string(),
            timeout_secs: 10,
            connect_timeout_secs: 5,
        }
    }
}

/// Rate limiting configuration.
///
/// One bucket is shared by the whole process; it cannot be resized while
/// running.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Bucket capacity (tokens granted per refill interval).
    pub capacity: u32,

    /// Time in milliseconds for an empty bucket to refill completely.
    pub refill_interval_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 3,
            refill_interval_ms: 60_000,
        }
    }
}

/// Cross-origin configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to call the gateway. Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024, // 64KB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [rate_limit]
            capacity = 10

            [cors]
            allowed_origins = ["http://localhost:3000"]
            "#,
        )
        .unwrap();

        assert_eq!(config.rate_limit.capacity, 10);
        assert_eq!(config.rate_limit.refill_interval_ms, 60_000);
        assert!(config.rate_limit.enabled);
        assert_eq!(config.cors.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.upstream.credential_header, "API_KEY");
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut config = GatewayConfig::default();
        config.upstream.api_key = Some("s3cret".into());

        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("s3cret"));
    }
}
