//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, resolve credential from env)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → handed to the composition root at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the rate limit bucket is sized once
//! - All fields have defaults to allow minimal configs
//! - Missing upstream credential is fatal at startup, never looked up per request

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CorsConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, RateLimitConfig,
    SecurityConfig, TimeoutConfig, UpstreamConfig,
};
